use serde::Deserialize;
use strum::{Display, EnumString};

/// How many on-screen integrations a single sheet record may edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MatchPolicy {
    /// Stop at the first matching integration in page order.
    #[default]
    First,
    /// Edit every matching integration, in page order.
    All,
}

pub const DEFAULT_EXCLUSION_TOKEN: &str = "wave";

/// Anything on the page that exposes a title we can match against.
pub trait Titled {
    fn title(&self) -> &str;
}

pub fn is_excluded(name: &str, token: &str) -> bool {
    !token.is_empty() && name.to_lowercase().contains(&token.to_lowercase())
}

pub fn title_matches(name: &str, title: &str) -> bool {
    title.to_lowercase().contains(&name.to_lowercase())
}

/// Returns the positions (in page order) of the candidates whose title
/// contains `name`, ignoring case. With [`MatchPolicy::First`] at most one
/// position is returned.
pub fn locate<T: Titled>(name: &str, candidates: &[T], policy: MatchPolicy) -> Vec<usize> {
    let mut matches = candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| title_matches(name, candidate.title()))
        .map(|(position, _)| position);

    match policy {
        MatchPolicy::First => matches.next().into_iter().collect(),
        MatchPolicy::All => matches.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Titled for &str {
        fn title(&self) -> &str {
            self
        }
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        for name in ["Wave Test", "NEW WAVE", "microwave", "wave"] {
            assert!(is_excluded(name, DEFAULT_EXCLUSION_TOKEN), "{name}");
        }
        assert!(!is_excluded("Acme West", DEFAULT_EXCLUSION_TOKEN));
    }

    #[test]
    fn test_empty_exclusion_token_excludes_nothing() {
        assert!(!is_excluded("Wave Test", ""));
    }

    #[test]
    fn test_name_is_substring_of_title() {
        assert!(title_matches("Acme", "ACME West Campaign"));
        assert!(!title_matches("Acme West Campaign", "Acme"));
    }

    #[test]
    fn test_first_policy_returns_first_match_only() {
        let titles = ["Beta", "ACME West", "Acme East"];
        assert_eq!(locate("acme", &titles, MatchPolicy::First), vec![1]);
    }

    #[test]
    fn test_all_policy_returns_every_match_in_page_order() {
        let titles = ["Acme East", "Beta", "ACME West"];
        assert_eq!(locate("Acme", &titles, MatchPolicy::All), vec![0, 2]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let titles = ["Beta", "Gamma"];
        assert!(locate("Acme", &titles, MatchPolicy::All).is_empty());
        assert!(locate("Acme", &titles, MatchPolicy::First).is_empty());
    }

    #[test]
    fn test_policy_parses_from_cli_text() {
        assert_eq!("all".parse::<MatchPolicy>().unwrap(), MatchPolicy::All);
        assert_eq!("First".parse::<MatchPolicy>().unwrap(), MatchPolicy::First);
        assert_eq!(MatchPolicy::All.to_string(), "all");
    }
}
