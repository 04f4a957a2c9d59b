/// Convert a team's results to a form string, oldest first (e.g. "WLWDW").
/// Only the last five rounds count.
pub fn results_to_form(results: &[(char, u32)]) -> String {
    let mut sorted_results = results.to_vec();
    sorted_results.sort_by_key(|(_, round)| *round);

    let skip = sorted_results.len().saturating_sub(5);
    sorted_results.iter().skip(skip).map(|(result, _)| *result).collect()
}

/// Calculate the share of available points won
pub fn calculate_win_percentage(wins: u32, draws: u32, losses: u32) -> f64 {
    let total_games = wins + losses + draws;
    if total_games == 0 {
        return 0.0;
    }

    let points = wins * 3 + draws;
    (points as f64) / ((total_games * 3) as f64) * 100.0
}

/// Format large numbers with appropriate suffixes
pub fn format_number(num: f64) -> String {
    if num >= 1_000_000.0 {
        format!("{:.1}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.1}K", num / 1_000.0)
    } else {
        format!("{:.0}", num)
    }
}

/// Validate team name format
pub fn validate_team_name(name: &str) -> bool {
    !name.trim().is_empty() && name.len() <= 100
}

/// Closest name by Jaro-Winkler similarity, if any clears `threshold`.
pub fn closest_name<'a, I>(query: &str, names: I, threshold: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.trim().to_lowercase();
    names
        .into_iter()
        .map(|name| (name, strsim::jaro_winkler(&query, &name.to_lowercase())))
        .filter(|(_, score)| *score >= threshold)
        .fold(None, |best: Option<(&str, f64)>, (name, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((name, score)),
        })
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_to_form_keeps_last_five_in_order() {
        let results = vec![('W', 3), ('L', 1), ('D', 2), ('W', 6), ('W', 4), ('L', 5)];
        assert_eq!(results_to_form(&results), "DWWLW");
        assert_eq!(results_to_form(&[]), "");
    }

    #[test]
    fn test_calculate_win_percentage() {
        assert!((calculate_win_percentage(3, 1, 1) - 66.67).abs() < 0.01);
        assert_eq!(calculate_win_percentage(0, 0, 0), 0.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(30_000.0), "30.0K");
        assert_eq!(format_number(2_500_000.0), "2.5M");
        assert_eq!(format_number(800.0), "800");
    }

    #[test]
    fn test_validate_team_name() {
        assert!(validate_team_name("Rustport Athletic"));
        assert!(!validate_team_name("   "));
        assert!(!validate_team_name(&"x".repeat(101)));
    }

    #[test]
    fn test_closest_name() {
        let teams = ["Northgate Rovers", "Harbour City", "Rustport Athletic"];
        assert_eq!(closest_name("harbor city", teams, 0.8), Some("Harbour City"));
        assert_eq!(closest_name("rustport", teams, 0.8), Some("Rustport Athletic"));
        assert_eq!(closest_name("zzzz", teams, 0.8), None);
    }
}
