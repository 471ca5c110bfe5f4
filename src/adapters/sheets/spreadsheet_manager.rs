use std::fmt::Debug;

use error_stack::{report, ResultExt};
use google_sheets4::Sheets;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use super::auth;
use super::http_client::{self, HttpsConnector};
use crate::adapters::config::sheets_config::SpreadsheetConfig;

pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    pub(super) hub: Sheets<HttpsConnector>,
    pub sheet_titles_cache: RwLock<Option<Vec<String>>>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ config: {:?} }}", self.config)
    }
}

#[derive(Error, Debug)]
pub enum SpreadsheetManagerError {
    #[error("Failed to authenticate with Google Sheets")]
    AuthenticationFailed,
    #[error("Failed to fetch sheet titles")]
    FailedToFetchSheetTitles,
    #[error("Failed to fetch range")]
    FailedToFetchRange,
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(config: SpreadsheetConfig) -> error_stack::Result<Self, SpreadsheetManagerError> {
        let client = http_client::http_client();
        let auth = auth::auth(&config, client.clone()).await?;
        let hub = Sheets::new(client, auth);

        Ok(SpreadsheetManager {
            config,
            hub,
            sheet_titles_cache: RwLock::new(None),
        })
    }

    #[instrument]
    async fn fetch_sheet_titles(&self) -> error_stack::Result<Vec<String>, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .get(&self.config.spreadsheet_id)
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToFetchSheetTitles)?;

        let sheets = response
            .1
            .sheets
            .ok_or(report!(SpreadsheetManagerError::FailedToFetchSheetTitles))
            .attach_printable("Sheets not present in spreadsheet response")?;

        Ok(sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties.and_then(|p| p.title))
            .collect())
    }

    /// Titles of every worksheet in the spreadsheet, in tab order.
    #[instrument]
    pub async fn sheet_titles(&self) -> error_stack::Result<Vec<String>, SpreadsheetManagerError> {
        if let Some(titles) = self.sheet_titles_cache.read().await.clone() {
            return Ok(titles);
        }

        let titles = self.fetch_sheet_titles().await?;

        {
            // -- MUTEX WRITE --
            let mut guard = self.sheet_titles_cache.write().await;
            guard.replace(titles.clone());
            // -- END MUTEX WRITE --
        }

        Ok(titles)
    }
}
