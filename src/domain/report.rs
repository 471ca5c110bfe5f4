use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedIntegration {
    pub record_name: String,
    pub title: String,
    pub list_id: String,
    pub previous_post_vars: String,
    pub post_vars: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedIntegration {
    pub record_name: String,
    pub reason: String,
}

/// Outcome of one update run, kept in memory and logged at the end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub dry_run: bool,
    pub updated: Vec<UpdatedIntegration>,
    pub excluded: Vec<String>,
    pub not_found: Vec<String>,
    pub failed: Vec<FailedIntegration>,
}

impl UpdateReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn record_failure(&mut self, record_name: &str, reason: impl Into<String>) {
        self.failed.push(FailedIntegration {
            record_name: record_name.to_owned(),
            reason: reason.into(),
        });
    }

    pub fn updated_titles(&self) -> Vec<&str> {
        self.updated.iter().map(|u| u.title.as_str()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.not_found.is_empty() && self.failed.is_empty()
    }
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "would update" } else { "updated" };
        write!(
            f,
            "{} {}, excluded {}, not found {}, failed {}",
            verb,
            self.updated.len(),
            self.excluded.len(),
            self.not_found.len(),
            self.failed.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut report = UpdateReport::new(false);
        report.excluded.push("Wave Test".into());
        report.record_failure("Beta", "Save button not found");

        assert_eq!(
            report.to_string(),
            "updated 0, excluded 1, not found 0, failed 1"
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_dry_run_summary() {
        let report = UpdateReport::new(true);
        assert!(report.to_string().starts_with("would update 0"));
        assert!(report.is_clean());
    }
}
