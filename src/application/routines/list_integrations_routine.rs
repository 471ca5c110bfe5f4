use error_stack::ResultExt;
use tracing::{debug, info, instrument};

use crate::domain::integration::{IntegrationGroups, IntegrationRecord};
use crate::domain::matching::is_excluded;
use crate::domain::row_filter::filter_active_integrations;
use crate::ports::routine::{Routine, RoutineError};
use crate::ports::row_source::RowSource;

/// Prints the active integrations of a worksheet without touching Listflex.
pub struct ListIntegrationsRoutine<R> {
    row_source: R,
    worksheet: String,
    exclusion_token: Option<String>,
}

impl<R: RowSource> ListIntegrationsRoutine<R> {
    pub fn new(row_source: R, worksheet: impl Into<String>, exclusion_token: Option<String>) -> Self {
        Self {
            row_source,
            worksheet: worksheet.into(),
            exclusion_token,
        }
    }

    #[instrument(skip(self), fields(worksheet = %self.worksheet))]
    pub async fn execute(&self) -> error_stack::Result<Vec<IntegrationRecord>, RoutineError> {
        let rows = self
            .row_source
            .fetch_rows(&self.worksheet)
            .await
            .change_context_lazy(|| RoutineError::routine_failure("Failed to read the worksheet"))?;

        filter_active_integrations(&rows)
            .change_context_lazy(|| RoutineError::routine_failure("Invalid worksheet layout"))
    }

    pub fn render(&self, records: &[IntegrationRecord]) -> String {
        let mut lines = Vec::with_capacity(records.len());
        for record in records {
            let excluded = self
                .exclusion_token
                .as_deref()
                .is_some_and(|token| is_excluded(record.name(), token));
            let marker = if excluded { " (excluded)" } else { "" };
            lines.push(format!("{}\t{}{}", record.list_id(), record.name(), marker));
        }
        lines.join("\n")
    }
}

#[async_trait::async_trait]
impl<R: RowSource> Routine for ListIntegrationsRoutine<R> {
    fn name(&self) -> &str {
        "list-integrations"
    }

    async fn run(&self) -> error_stack::Result<(), RoutineError> {
        let records = self.execute().await?;
        let groups = IntegrationGroups::from_records(&records);

        info!(
            "Found {} active integrations across {} lists.",
            records.len(),
            groups.len()
        );
        println!("{}", self.render(&records));

        for (list_id, names) in groups.iter() {
            if names.len() > 1 {
                info!("List {} is shared by {:?}", list_id, names);
            } else {
                debug!("List {} belongs to {:?}", list_id, names);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use error_stack::report;

    use super::*;
    use crate::ports::row_source::RowSourceError;

    struct StaticRows(Vec<Vec<String>>);

    #[async_trait::async_trait]
    impl RowSource for StaticRows {
        async fn fetch_rows(
            &self,
            worksheet: &str,
        ) -> error_stack::Result<Vec<Vec<String>>, RowSourceError> {
            if worksheet != "MARCH 25 NEW NEW" {
                return Err(report!(RowSourceError::FetchFailed(worksheet.to_owned())));
            }
            Ok(self.0.clone())
        }
    }

    fn rows() -> StaticRows {
        StaticRows(
            [
                ["Status", "Convoso List Name", "Convoso"],
                ["Active", "Acme West", "8842"],
                ["Active", "Wave Test", "100"],
                ["paused", "Beta", "200"],
            ]
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
        )
    }

    #[tokio::test]
    async fn test_lists_active_records_including_excluded_ones() {
        let routine = ListIntegrationsRoutine::new(rows(), "MARCH 25 NEW NEW", Some("wave".into()));

        let records = routine.execute().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            routine.render(&records),
            "8842\tAcme West\n100\tWave Test (excluded)"
        );
    }

    #[tokio::test]
    async fn test_unknown_worksheet_fails() {
        let routine = ListIntegrationsRoutine::new(rows(), "APRIL", None);
        assert!(routine.execute().await.is_err());
    }
}
