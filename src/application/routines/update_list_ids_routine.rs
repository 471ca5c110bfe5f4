use error_stack::ResultExt;
use tracing::{error, info, instrument, warn, Instrument};

use crate::domain::integration::{IntegrationGroups, IntegrationRecord};
use crate::domain::matching::{is_excluded, locate, MatchPolicy};
use crate::domain::post_vars::{
    current_list_id, is_valid_list_id, patch_list_id, POST_VARS_FIELD_ID,
};
use crate::domain::report::{UpdateReport, UpdatedIntegration};
use crate::domain::row_filter::filter_active_integrations;
use crate::ports::routine::{Routine, RoutineError};
use crate::ports::row_source::RowSource;
use crate::ports::session_driver::{
    Credentials, SessionDriver, SessionError, SessionFactory, UiCandidate,
};

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub worksheet: String,
    pub credentials: Credentials,
    pub match_policy: MatchPolicy,
    pub exclusion_token: String,
    pub dry_run: bool,
}

/// Records that survived filtering and exclusion, in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    pub records: Vec<IntegrationRecord>,
    pub excluded: Vec<String>,
}

/// Points each active Listflex integration at the Convoso list id from the sheet.
pub struct UpdateListIdsRoutine<R, F> {
    name: String,
    row_source: R,
    sessions: F,
    options: UpdateOptions,
}

impl<R, F> UpdateListIdsRoutine<R, F>
where
    R: RowSource,
    F: SessionFactory,
{
    pub fn new(name: impl Into<String>, row_source: R, sessions: F, options: UpdateOptions) -> Self {
        Self {
            name: name.into(),
            row_source,
            sessions,
            options,
        }
    }

    /// Reads and validates the sheet. Fails before any browser is started when
    /// the worksheet is unreadable or lacks a required column.
    #[instrument(skip(self), fields(worksheet = %self.options.worksheet))]
    pub async fn plan(&self) -> error_stack::Result<UpdatePlan, RoutineError> {
        let rows = self
            .row_source
            .fetch_rows(&self.options.worksheet)
            .await
            .change_context_lazy(|| RoutineError::routine_failure("Failed to read the worksheet"))?;

        let records = filter_active_integrations(&rows)
            .change_context_lazy(|| RoutineError::routine_failure("Invalid worksheet layout"))?;

        info!("Found {} active integrations to update.", records.len());

        let (excluded, records): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| is_excluded(record.name(), &self.options.exclusion_token));

        for record in &excluded {
            warn!(
                "Skipping '{}' ({} integration).",
                record.name(),
                self.options.exclusion_token.to_uppercase()
            );
        }

        let groups = IntegrationGroups::from_records(&records);
        for (list_id, names) in groups.shared() {
            info!(list_id, "{} integrations share list {}: {:?}", names.len(), list_id, names);
        }

        Ok(UpdatePlan {
            records,
            excluded: excluded.into_iter().map(|r| r.name().to_owned()).collect(),
        })
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> error_stack::Result<UpdateReport, RoutineError> {
        let plan = self.plan().await?;

        let mut report = UpdateReport::new(self.options.dry_run);
        report.excluded = plan.excluded.clone();

        if plan.records.is_empty() {
            info!("Nothing to update");
            return Ok(report);
        }

        let driver = self
            .sessions
            .open()
            .await
            .change_context_lazy(|| RoutineError::routine_failure("Failed to start the browser"))?;

        let result = self.apply(&driver, &plan, &mut report).await;
        driver.close().await;

        result.map(|_| report)
    }

    async fn apply(
        &self,
        driver: &F::Driver,
        plan: &UpdatePlan,
        report: &mut UpdateReport,
    ) -> error_stack::Result<(), RoutineError> {
        driver
            .authenticate(&self.options.credentials)
            .await
            .change_context_lazy(|| RoutineError::routine_failure("Failed to log into Listflex"))?;

        let len = plan.records.len();
        for (index, record) in plan.records.iter().enumerate() {
            let span = tracing::span!(
                tracing::Level::INFO,
                "integration",
                name = record.name(),
                index = index,
                len = len
            );

            if !is_valid_list_id(record.list_id()) {
                error!(parent: &span, "Invalid list id '{}' for '{}'", record.list_id(), record.name());
                report.record_failure(record.name(), format!("invalid list id '{}'", record.list_id()));
                continue;
            }

            info!(parent: &span, "Searching for integration: {}", record);
            if let Err(failure) = self.update_record(driver, record, report).instrument(span).await {
                error!("❌ Error updating integration '{}': {:?}", record.name(), failure);
                report.record_failure(record.name(), failure.current_context().to_string());
            }
        }

        Ok(())
    }

    async fn update_record(
        &self,
        driver: &F::Driver,
        record: &IntegrationRecord,
        report: &mut UpdateReport,
    ) -> error_stack::Result<(), SessionError> {
        let mut candidates = relist(driver).await?;

        let targets = locate(record.name(), &candidates, self.options.match_policy)
            .into_iter()
            .map(|position| (position, candidates[position].title.clone()))
            .collect::<Vec<_>>();

        if targets.is_empty() {
            warn!("Could not find integration '{}'. Skipping...", record.name());
            report.not_found.push(record.name().to_owned());
            return Ok(());
        }

        for (attempt, (position, title)) in targets.into_iter().enumerate() {
            // Elements go stale after a save, so later targets need a fresh listing
            if attempt > 0 {
                match relist(driver).await {
                    Ok(fresh) => candidates = fresh,
                    Err(failure) => {
                        error!("❌ Could not reopen the listing for '{}': {:?}", title, failure);
                        report.record_failure(
                            record.name(),
                            format!("{}: {}", title, failure.current_context()),
                        );
                        continue;
                    }
                }
            }

            let Some(candidate) = find_candidate(&candidates, position, &title) else {
                warn!("Integration '{}' disappeared from the listing", title);
                report.record_failure(record.name(), format!("'{}' disappeared from the listing", title));
                continue;
            };

            info!("Found integration: {}", title);
            match self.edit_integration(driver, record, candidate).await {
                Ok(updated) => report.updated.push(updated),
                Err(failure) => {
                    error!("❌ Error updating integration '{}': {:?}", title, failure);
                    report.record_failure(
                        record.name(),
                        format!("{}: {}", title, failure.current_context()),
                    );
                }
            }
        }

        Ok(())
    }

    async fn edit_integration(
        &self,
        driver: &F::Driver,
        record: &IntegrationRecord,
        candidate: &UiCandidate<<F::Driver as SessionDriver>::Handle>,
    ) -> error_stack::Result<UpdatedIntegration, SessionError> {
        driver.select(&candidate.handle).await?;

        let previous = driver.read_field_value(POST_VARS_FIELD_ID).await?;
        let updated = patch_list_id(&previous, record.list_id());

        let result = UpdatedIntegration {
            record_name: record.name().to_owned(),
            title: candidate.title.clone(),
            list_id: record.list_id().to_owned(),
            previous_post_vars: previous,
            post_vars: updated,
        };

        if self.options.dry_run {
            info!(
                "Would update '{}': {} → {}",
                result.title, result.previous_post_vars, result.post_vars
            );
            return Ok(result);
        }

        driver
            .write_field_value(POST_VARS_FIELD_ID, &result.post_vars)
            .await?;
        info!(
            "Updated '{}' list_id {} → {}",
            result.title,
            current_list_id(&result.previous_post_vars).unwrap_or("(none)"),
            result.list_id
        );

        driver.submit().await?;
        info!("✅ Saved integration {}", result.title);

        Ok(result)
    }
}

async fn relist<D: SessionDriver>(
    driver: &D,
) -> error_stack::Result<Vec<UiCandidate<D::Handle>>, SessionError> {
    driver.open_integrations().await?;
    driver.list_candidates().await
}

fn find_candidate<'a, H>(
    candidates: &'a [UiCandidate<H>],
    position: usize,
    title: &str,
) -> Option<&'a UiCandidate<H>> {
    candidates
        .get(position)
        .filter(|candidate| candidate.title == title)
        .or_else(|| candidates.iter().find(|candidate| candidate.title == title))
}

#[async_trait::async_trait]
impl<R, F> Routine for UpdateListIdsRoutine<R, F>
where
    R: RowSource,
    F: SessionFactory,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> error_stack::Result<(), RoutineError> {
        let report = self.execute().await?;

        info!("{}", report);
        if report.is_clean() && !report.updated.is_empty() {
            info!("✅ Every matched integration was updated.");
        }
        if !report.updated.is_empty() {
            info!("Successfully updated integrations: {:?}", report.updated_titles());
        } else {
            info!("No integrations updated.");
        }
        if !report.not_found.is_empty() {
            warn!("Not found: {:?}", report.not_found);
        }
        for failure in &report.failed {
            error!("Failed: {} ({})", failure.record_name, failure.reason);
        }

        Ok(())
    }
}
