use chrono::{Datelike, Months, NaiveDate};
use serde::Deserialize;

/// Which tab of the spreadsheet holds the integration list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorksheetSelector {
    Fixed { name: String },
    /// Upper-cased English name of next month followed by `suffix`,
    /// e.g. `APRIL 25 NEW NEW`.
    NextMonth { suffix: String },
}

impl WorksheetSelector {
    pub fn resolve(&self, today: NaiveDate) -> String {
        match self {
            WorksheetSelector::Fixed { name } => name.clone(),
            WorksheetSelector::NextMonth { suffix } => {
                format!("{}{}", next_month_name(today), suffix)
            }
        }
    }
}

pub fn next_month_name(today: NaiveDate) -> String {
    let first_of_month = today.with_day(1).unwrap_or(today);
    first_of_month
        .checked_add_months(Months::new(1))
        .unwrap_or(first_of_month)
        .format("%B")
        .to_string()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_month_name() {
        assert_eq!(next_month_name(date(2025, 2, 14)), "MARCH");
        assert_eq!(next_month_name(date(2025, 3, 31)), "APRIL");
        assert_eq!(next_month_name(date(2025, 1, 31)), "FEBRUARY");
    }

    #[test]
    fn test_next_month_wraps_year() {
        assert_eq!(next_month_name(date(2025, 12, 15)), "JANUARY");
    }

    #[test]
    fn test_next_month_selector_appends_suffix() {
        let selector = WorksheetSelector::NextMonth {
            suffix: " 25 NEW NEW".into(),
        };
        assert_eq!(selector.resolve(date(2025, 12, 15)), "JANUARY 25 NEW NEW");
    }

    #[test]
    fn test_fixed_selector_ignores_date() {
        let selector = WorksheetSelector::Fixed {
            name: "MARCH 25 - OG".into(),
        };
        assert_eq!(selector.resolve(date(2030, 7, 1)), "MARCH 25 - OG");
    }

    #[test]
    fn test_selector_deserializes_from_tagged_table() {
        let selector: WorksheetSelector = serde_json::from_value(serde_json::json!({
            "kind": "next_month",
            "suffix": " 25 NEW NEW",
        }))
        .unwrap();
        assert_eq!(
            selector,
            WorksheetSelector::NextMonth {
                suffix: " 25 NEW NEW".into()
            }
        );
    }
}
