pub mod generator;
pub use generator::*;

use serde::Deserialize;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use crate::error::EngineError;
use crate::models::{Attributes, Player, Position};

pub const REQUIRED_COLUMNS: [&str; 13] = [
    "name",
    "position",
    "age",
    "nationality",
    "pace",
    "shooting",
    "passing",
    "technique",
    "power",
    "defending",
    "physical",
    "mental",
    "goalkeeping",
];

pub const MIN_PLAYER_AGE: u8 = 15;

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    position: String,
    age: u8,
    nationality: String,
    pace: u8,
    shooting: u8,
    passing: u8,
    technique: u8,
    power: u8,
    defending: u8,
    physical: u8,
    mental: u8,
    goalkeeping: u8,
    #[serde(default)]
    appearances: Option<u32>,
    #[serde(default)]
    goals: Option<u32>,
}

impl RosterRow {
    fn into_player(self, line: u64, source_name: &str) -> Result<Player, EngineError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::roster(source_name, format!("line {}: empty player name", line)));
        }

        let position = self.position.parse::<Position>()
            .map_err(|e| EngineError::roster(source_name, format!("line {}: {}", line, e)))?;

        if self.age < MIN_PLAYER_AGE {
            return Err(EngineError::roster(
                source_name,
                format!("line {}: {} is {} but players must be at least {}", line, name, self.age, MIN_PLAYER_AGE),
            ));
        }

        Ok(Player {
            name,
            position,
            age: self.age,
            nationality: self.nationality.trim().to_string(),
            attributes: Attributes {
                pace: self.pace,
                shooting: self.shooting,
                passing: self.passing,
                technique: self.technique,
                power: self.power,
                defending: self.defending,
                physical: self.physical,
                mental: self.mental,
                goalkeeping: self.goalkeeping,
            },
            club: None,
            appearances: self.appearances.unwrap_or(0),
            goals: self.goals.unwrap_or(0),
            yellow_cards: 0,
        })
    }
}

/// Load the human club's players from a CSV file.
pub fn load_roster(path: &Path) -> Result<Vec<Player>, EngineError> {
    let source_name = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| EngineError::roster(&source_name, e.to_string()))?;
    let players = parse_roster(file, &source_name)?;
    tracing::info!("Loaded {} players from {}", players.len(), source_name);
    Ok(players)
}

/// Parse roster CSV from any reader, validating it against the player schema.
pub fn parse_roster<R: io::Read>(reader: R, source_name: &str) -> Result<Vec<Player>, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| EngineError::roster(source_name, e.to_string()))?
        .clone();
    let present: BTreeSet<String> = headers.iter().map(str::to_string).collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !present.contains(*column))
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::roster(
            source_name,
            format!("missing required columns: {}", missing.join(", ")),
        ));
    }

    let mut players: Vec<Player> = Vec::new();
    let mut seen = BTreeSet::new();

    for record in reader.deserialize::<RosterRow>() {
        let row = record.map_err(|e| EngineError::roster(source_name, e.to_string()))?;
        let line = players.len() as u64 + 2; // header is line 1
        let player = row.into_player(line, source_name)?;

        if !seen.insert(player.name.clone()) {
            return Err(EngineError::roster(
                source_name,
                format!("line {}: duplicate player name '{}'", line, player.name),
            ));
        }
        players.push(player);
    }

    if players.is_empty() {
        return Err(EngineError::roster(source_name, "roster contains no players"));
    }

    Ok(players)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const SAMPLE: &str = "\
name,position,age,nationality,pace,shooting,passing,technique,power,defending,physical,mental,goalkeeping,appearances,goals
Ada Keeper,GK,29,England,50,30,60,55,60,40,70,75,82,10,0
Bo Wall,DF,27,Norway,68,45,62,60,70,80,78,70,20,,
Cy Engine,MF,24,Spain,72,65,80,78,62,60,68,74,15,3,1
Di Striker,FW,22,Brazil,84,83,66,80,75,35,70,64,10,,4
";

    #[test]
    fn test_parse_sample_roster() {
        let players = parse_roster(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!(players.len(), 4);
        assert_eq!(players[0].position, Position::Goalkeeper);
        assert_eq!(players[0].appearances, 10);
        // Empty counters default to zero
        assert_eq!(players[1].appearances, 0);
        assert_eq!(players[1].goals, 0);
        assert_eq!(players[3].goals, 4);
        assert!(players.iter().all(|p| p.club.is_none()));
    }

    #[test]
    fn test_missing_counter_columns_default_to_zero() {
        let data = "name,position,age,nationality,pace,shooting,passing,technique,power,defending,physical,mental,goalkeeping\n\
                    Solo,MF,30,Italy,60,60,60,60,60,60,60,60,60\n";
        let players = parse_roster(data.as_bytes(), "inline").unwrap();
        assert_eq!(players[0].appearances, 0);
        assert_eq!(players[0].goals, 0);
    }

    #[test]
    fn test_missing_required_column_is_rejected() {
        let data = "name,position,age,nationality,pace,shooting\nSolo,MF,30,Italy,60,60\n";
        match parse_roster(data.as_bytes(), "inline") {
            Err(EngineError::RosterLoad { reason, .. }) => {
                assert!(reason.contains("passing"));
                assert!(reason.contains("goalkeeping"));
            }
            other => panic!("expected roster error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_position_and_age_are_rejected() {
        let header = "name,position,age,nationality,pace,shooting,passing,technique,power,defending,physical,mental,goalkeeping\n";
        let bad_position = format!("{}X,ST,20,Peru,1,1,1,1,1,1,1,1,1\n", header);
        assert!(matches!(
            parse_roster(bad_position.as_bytes(), "inline"),
            Err(EngineError::RosterLoad { .. })
        ));

        let too_young = format!("{}Kid,FW,12,Peru,1,1,1,1,1,1,1,1,1\n", header);
        assert!(matches!(
            parse_roster(too_young.as_bytes(), "inline"),
            Err(EngineError::RosterLoad { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let header = "name,position,age,nationality,pace,shooting,passing,technique,power,defending,physical,mental,goalkeeping\n";
        let data = format!("{}Twin,FW,20,Peru,1,1,1,1,1,1,1,1,1\nTwin,DF,21,Peru,1,1,1,1,1,1,1,1,1\n", header);
        assert!(matches!(
            parse_roster(data.as_bytes(), "inline"),
            Err(EngineError::RosterLoad { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_a_roster_error() {
        let err = load_roster(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, EngineError::RosterLoad { .. }));
    }
}
