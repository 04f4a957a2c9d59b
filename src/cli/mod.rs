use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::models::{MatchResult, PlayerStatus, StandingRow};
use crate::services::Session;
use crate::utils::{calculate_win_percentage, closest_name, format_number};

const TEAM_MATCH_THRESHOLD: f64 = 0.8;

fn print_result(result: &MatchResult) {
    let scorers: Vec<String> = result
        .goals
        .iter()
        .map(|g| g.scorer.clone().unwrap_or_else(|| format!("{} (unknown)", g.team)))
        .collect();

    println!(
        "   {} {}-{} {}   (xG {:.2}-{:.2})",
        result.home, result.home_goals, result.away_goals, result.away, result.home_xg, result.away_xg
    );
    if !scorers.is_empty() {
        println!("      ⚽ {}", scorers.join(", "));
    }
    for card in &result.cards {
        println!("      🟨 {} ({})", card.player, card.team);
    }
    for injury in &result.injuries {
        println!("      🚑 {} ({}) out for {} round(s)", injury.player, injury.team, injury.recovery_rounds);
    }
}

fn print_standings(standings: &[StandingRow]) {
    println!("\n🏆 Standings:");
    println!("   {:>2}  {:<24} {:>2} {:>2} {:>2} {:>2} {:>3} {:>3} {:>4} {:>3}  Form",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts");
    for row in standings {
        println!("   {:>2}  {:<24} {:>2} {:>2} {:>2} {:>2} {:>3} {:>3} {:>4} {:>3}  {}",
            row.position,
            row.team,
            row.played,
            row.wins,
            row.draws,
            row.losses,
            row.goals_for,
            row.goals_against,
            row.goal_difference,
            row.points,
            row.form
        );
    }
}

/// Play `rounds` rounds (the rest of the season when `None`) and report.
pub fn play_season(session: &mut Session, rounds: Option<u32>) -> Result<()> {
    let remaining = (session.total_rounds() + 1).saturating_sub(session.current_round());
    let to_play = rounds.unwrap_or(remaining).min(remaining);

    if to_play == 0 {
        println!("📭 The season is already complete.");
        return Ok(());
    }

    println!("⚽ Playing {} round(s) of {}...", to_play, session.total_rounds());

    for _ in 0..to_play {
        let summary = session.advance_round()?;
        println!("\n📅 Round {}:", summary.round);
        for result in &summary.results {
            print_result(result);
        }
        if let Some(entry) = session.history().last() {
            for team in &entry.byes {
                println!("   💤 {} has a bye", team);
            }
        }
    }

    print_standings(&session.table());

    let scorers = session.top_scorers(5);
    if !scorers.is_empty() {
        println!("\n🎯 Top scorers:");
        for (i, scorer) in scorers.iter().enumerate() {
            println!("   {}. {} ({}) - {} goals in {} apps", i + 1, scorer.player, scorer.club, scorer.goals, scorer.appearances);
        }
    }

    if session.phase() == crate::models::SeasonPhase::Complete {
        if let Some(champion) = session.table().first() {
            println!("\n✅ Season complete! {} are champions.", champion.team);
        }
    }

    Ok(())
}

pub fn query_team(session: &Session, team_name: &str) -> Result<()> {
    println!("🔍 Searching for team: {}", team_name);

    let names: Vec<&str> = session.teams().iter().map(|t| t.name.as_str()).collect();
    let Some(found) = closest_name(team_name, names.iter().copied(), TEAM_MATCH_THRESHOLD) else {
        println!("❌ No teams found matching '{}'", team_name);
        println!("\n💡 Available teams:");
        for name in names {
            println!("   • {}", name);
        }
        return Ok(());
    };

    let team = session
        .team(found)
        .with_context(|| format!("team '{}' disappeared from the session", found))?;

    println!("📊 Team Details:");
    println!("   Name: {}", team.name);
    println!("   Play style: {}", team.play_style());
    if let Some(funds) = team.funds() {
        println!("   Funds: {}", format_number(funds as f64));
    }
    if let Some(row) = session.table().iter().find(|r| r.team == team.name) {
        println!("   Position: {} ({} pts, {:.1}% of available points, form {})",
            row.position,
            row.points,
            calculate_win_percentage(row.wins, row.draws, row.losses),
            if row.form.is_empty() { "-" } else { row.form.as_str() }
        );
    }

    println!("\n👥 Squad:");
    for player in &team.players {
        let status = match session.player_status(&player.name) {
            PlayerStatus::Available => String::new(),
            PlayerStatus::Injured { until_round } => format!(" 🚑 until round {}", until_round),
            PlayerStatus::Suspended { round } => format!(" ⛔ suspended round {}", round),
        };
        println!("   {} {:<26} age {:>2} {:<12} rating {:>5.1} | {} apps {} goals {} yellows{}",
            player.position,
            player.name,
            player.age,
            player.nationality,
            player.rating(),
            player.appearances,
            player.goals,
            player.yellow_cards,
            status
        );
    }

    println!("\n📅 Fixtures:");
    for fixture in session.fixtures_for(&team.name) {
        let played = session
            .history()
            .get(fixture.round as usize - 1)
            .and_then(|entry| entry.results.iter().find(|r| r.home == fixture.home && r.away == fixture.away));
        let score = match played {
            Some(result) => format!("({}-{})", result.home_goals, result.away_goals),
            None => "(TBD)".to_string(),
        };
        let (venue, opponent) = if fixture.home == team.name { ("vs", &fixture.away) } else { ("at", &fixture.home) };
        println!("   R{:>2} {} {} {}", fixture.round, venue, opponent, score);
    }

    Ok(())
}

/// Roll a scout list and optionally sign the candidate at `sign` (1-based).
pub fn scout(session: &mut Session, sign: Option<usize>) -> Result<()> {
    println!("🔭 Scouting new players... (funds: {})", format_number(session.funds() as f64));

    let candidates = session.refresh_candidates().to_vec();
    for (i, candidate) in candidates.iter().enumerate() {
        let player = &candidate.player;
        println!("{}. {} {} ({}, {}) rating {:.1} - asking {}",
            i + 1,
            player.position,
            player.name,
            player.age,
            player.nationality,
            player.rating(),
            format_number(candidate.asking_price as f64)
        );
    }

    let Some(choice) = sign else {
        println!("\n💡 Use 'seasonforge scout --sign <n>' to sign one of them");
        return Ok(());
    };

    let Some(candidate) = choice.checked_sub(1).and_then(|i| candidates.get(i)) else {
        bail!("no candidate number {} in a list of {}", choice, candidates.len());
    };

    let player = session.sign(candidate.id)?;
    println!("\n✅ Signed {} for {}! Funds left: {}",
        player.name,
        format_number(candidate.asking_price as f64),
        format_number(session.funds() as f64)
    );

    Ok(())
}

/// Simulate the rest of the season and write the final standings.
pub fn export_standings(session: &mut Session, format: &str, path: &Path) -> Result<()> {
    while session.phase() != crate::models::SeasonPhase::Complete {
        session.advance_round()?;
    }
    let standings = session.table();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match format.to_lowercase().as_str() {
        "csv" => {
            let mut writer = csv::Writer::from_path(path)?;
            for row in &standings {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        "json" => {
            let json_str = serde_json::to_string_pretty(&standings)?;
            std::fs::write(path, json_str)?;
        }
        _ => bail!("Unsupported format: {}. Use 'csv' or 'json'", format),
    }

    println!("✅ Wrote {} standings rows to {}", standings.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::tests::test_session;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("seasonforge_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_play_stops_at_season_end() {
        let mut session = test_session(42);
        play_season(&mut session, Some(3)).unwrap();
        assert_eq!(session.current_round(), 4);

        play_season(&mut session, None).unwrap();
        assert_eq!(session.phase(), crate::models::SeasonPhase::Complete);
        assert!(play_season(&mut session, Some(2)).is_ok());
    }

    #[test]
    fn test_scout_signs_by_index() {
        let mut session = test_session(42);
        scout(&mut session, Some(1)).unwrap();
        assert_eq!(session.human().players.len(), 5);
        assert_eq!(session.candidates().len(), 4);

        assert!(scout(&mut session, Some(9)).is_err());
        assert!(scout(&mut session, Some(0)).is_err());
    }

    #[test]
    fn test_query_team_accepts_fuzzy_names() {
        let session = test_session(42);
        assert!(query_team(&session, "rustport athletc").is_ok());
        assert!(query_team(&session, "nobody at all").is_ok());
    }

    #[test]
    fn test_export_csv_and_json() {
        let csv_path = temp_path("standings.csv");
        let mut session = test_session(42);
        export_standings(&mut session, "csv", &csv_path).unwrap();

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let rows: Vec<StandingRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, session.table());

        let json_path = temp_path("standings.json");
        export_standings(&mut session, "json", &json_path).unwrap();
        let rows: Vec<StandingRow> = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(rows.len(), 8);

        assert!(export_standings(&mut session, "xml", &temp_path("standings.xml")).is_err());

        let _ = std::fs::remove_file(csv_path);
        let _ = std::fs::remove_file(json_path);
    }
}
