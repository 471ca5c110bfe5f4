use error_stack::ResultExt;
use tracing::instrument;

use super::{
    cell_values::IntoStringRows,
    spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError},
};
use crate::ports::row_source::{RowSource, RowSourceError};

/// A1 range covering a whole worksheet: the quoted sheet name.
pub fn whole_sheet_range(sheet_title: &str) -> String {
    format!("'{}'", sheet_title.replace('\'', "''"))
}

pub trait SpreadsheetRead {
    fn read_range(
        &self,
        range: &str,
    ) -> impl std::future::Future<
        Output = error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError>,
    > + Send;

    fn read_sheet(
        &self,
        sheet_title: &str,
    ) -> impl std::future::Future<
        Output = error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError>,
    > + Send;
}

impl SpreadsheetRead for SpreadsheetManager {
    #[instrument]
    async fn read_range(
        &self,
        range: &str,
    ) -> error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .values_get(&self.config.spreadsheet_id, range)
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToFetchRange)
            .attach_printable_lazy(|| format!("Failed to fetch values for range {}", range))?;

        // A range with no values at all comes back without the `values` key
        let values = response.1.values.unwrap_or_default().into_string_rows();

        Ok(values)
    }

    #[instrument]
    async fn read_sheet(
        &self,
        sheet_title: &str,
    ) -> error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError> {
        self.read_range(&whole_sheet_range(sheet_title)).await
    }
}

#[async_trait::async_trait]
impl RowSource for SpreadsheetManager {
    async fn fetch_rows(
        &self,
        worksheet: &str,
    ) -> error_stack::Result<Vec<Vec<String>>, RowSourceError> {
        match self.read_sheet(worksheet).await {
            Ok(rows) => Ok(rows),
            Err(report) => {
                let available = self.sheet_titles().await.unwrap_or_default();
                Err(report
                    .change_context(RowSourceError::FetchFailed(worksheet.to_owned()))
                    .attach_printable(format!("Available worksheets: {:?}", available)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_sheet_range_quotes_title() {
        assert_eq!(whole_sheet_range("MARCH 25 - OG"), "'MARCH 25 - OG'");
    }

    #[test]
    fn test_whole_sheet_range_escapes_quotes() {
        assert_eq!(whole_sheet_range("Bob's list"), "'Bob''s list'");
    }
}
