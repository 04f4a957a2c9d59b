use rand::rngs::StdRng;
use rand::RngExt;
use std::collections::BTreeSet;

use crate::models::{Attributes, ClubKind, PlayStyle, Player, Position, Team};

pub const MIN_GENERATED_ATTRIBUTE: u8 = 55;
pub const MAX_GENERATED_ATTRIBUTE: u8 = 85;

const FIRST_NAMES: [&str; 32] = [
    "Aaron", "Bruno", "Carlos", "Dario", "Emil", "Felix", "Goran", "Hugo",
    "Ivan", "Jonas", "Kenji", "Luca", "Marco", "Nico", "Oscar", "Pavel",
    "Quentin", "Rafael", "Stefan", "Tomas", "Umar", "Victor", "Wim", "Xavi",
    "Yusuf", "Zoran", "Adrien", "Bastian", "Cian", "Diego", "Elias", "Finn",
];

const LAST_NAMES: [&str; 40] = [
    "Almeida", "Bergstrom", "Castillo", "Dembele", "Eriksen", "Fontaine", "Gallo", "Hartmann",
    "Ibarra", "Jankovic", "Kowalski", "Lindqvist", "Moreau", "Novak", "Okafor", "Petrov",
    "Quaresma", "Rossi", "Santos", "Tanaka", "Ulrich", "Varga", "Weber", "Xhaka",
    "Yilmaz", "Zielinski", "Andersen", "Bianchi", "Costa", "Duarte", "Esposito", "Fischer",
    "Gomez", "Horvat", "Iversen", "Jensen", "Keller", "Lopes", "Mensah", "Nilsen",
];

const NATIONALITIES: [&str; 14] = [
    "England", "Spain", "Italy", "Germany", "France", "Brazil", "Argentina",
    "Portugal", "Netherlands", "Norway", "Poland", "Nigeria", "Japan", "Croatia",
];

const AI_CLUB_NAMES: [&str; 10] = [
    "Northgate Rovers",
    "Harbour City",
    "Ironbridge United",
    "Westmere Wanderers",
    "Kingsport Albion",
    "Redcliffe Town",
    "Ashford Athletic",
    "Stonehaven FC",
    "Millbrook Rangers",
    "Eastvale Orient",
];

// 16-man squad shape: (position, count)
const SQUAD_TEMPLATE: [(Position, usize); 4] = [
    (Position::Goalkeeper, 2),
    (Position::Defender, 5),
    (Position::Midfielder, 5),
    (Position::Forward, 4),
];

// Positions used to grow a squad past the template.
const SQUAD_OVERFLOW: [Position; 4] = [
    Position::Defender,
    Position::Midfielder,
    Position::Forward,
    Position::Midfielder,
];

/// Session-wide set of taken names. Player names (and club names) must be
/// unique, so every generated or loaded identity goes through `claim`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
    taken: BTreeSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `base`, or the first free disambiguated variant: "Name (2)",
    /// "Name (3)", and so on.
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{} ({})", base, suffix);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub fn release(&mut self, name: &str) {
        self.taken.remove(name);
    }
}

/// Positions for a squad of the requested size, goalkeepers first.
pub fn squad_positions(size: usize) -> Vec<Position> {
    let mut positions: Vec<Position> = SQUAD_TEMPLATE
        .iter()
        .flat_map(|(position, count)| std::iter::repeat(*position).take(*count))
        .collect();

    let mut overflow = SQUAD_OVERFLOW.iter().cycle();
    while positions.len() < size {
        if let Some(position) = overflow.next() {
            positions.push(*position);
        }
    }

    positions.truncate(size);
    positions
}

fn roll(rng: &mut StdRng) -> u8 {
    rng.random_range(MIN_GENERATED_ATTRIBUTE..=MAX_GENERATED_ATTRIBUTE)
}

/// Roll attributes in the generated range, leaning the position's key
/// attributes towards the top of it.
pub fn roll_attributes(rng: &mut StdRng, position: Position) -> Attributes {
    let mut attrs = Attributes {
        pace: roll(rng),
        shooting: roll(rng),
        passing: roll(rng),
        technique: roll(rng),
        power: roll(rng),
        defending: roll(rng),
        physical: roll(rng),
        mental: roll(rng),
        goalkeeping: roll(rng),
    };

    let boost: u8 = rng.random_range(0..=8);
    let lift = |value: &mut u8| *value = value.saturating_add(boost).min(MAX_GENERATED_ATTRIBUTE);
    match position {
        Position::Goalkeeper => lift(&mut attrs.goalkeeping),
        Position::Defender => lift(&mut attrs.defending),
        Position::Midfielder => lift(&mut attrs.passing),
        Position::Forward => lift(&mut attrs.shooting),
    }

    attrs
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.random_range(0..options.len())]
}

/// Roll a fresh, club-less player with a unique name.
pub fn roll_player(rng: &mut StdRng, names: &mut NameRegistry, position: Position) -> Player {
    let base = format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES));
    let name = names.claim(&base);

    Player {
        name,
        position,
        age: rng.random_range(18..=34),
        nationality: pick(rng, &NATIONALITIES).to_string(),
        attributes: roll_attributes(rng, position),
        club: None,
        appearances: 0,
        goals: 0,
        yellow_cards: 0,
    }
}

pub fn generate_squad(rng: &mut StdRng, names: &mut NameRegistry, club: &str, size: usize) -> Vec<Player> {
    squad_positions(size)
        .into_iter()
        .map(|position| {
            let mut player = roll_player(rng, names, position);
            player.club = Some(club.to_string());
            player
        })
        .collect()
}

/// Generate the AI clubs with their rosters and season play styles.
pub fn generate_ai_clubs(
    rng: &mut StdRng,
    names: &mut NameRegistry,
    club_names: &mut NameRegistry,
    count: usize,
    squad_size: usize,
) -> Vec<Team> {
    (0..count)
        .map(|i| {
            let base = AI_CLUB_NAMES[i % AI_CLUB_NAMES.len()];
            let name = club_names.claim(base);
            let style = PlayStyle::ALL[rng.random_range(0..PlayStyle::ALL.len())];
            let players = generate_squad(rng, names, &name, squad_size);

            tracing::debug!("Generated {} ({}) with {} players", name, style, players.len());

            Team {
                name,
                kind: ClubKind::Ai { style },
                players,
            }
        })
        .collect()
}
