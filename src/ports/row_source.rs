use thiserror::Error;

#[derive(Error, Debug)]
pub enum RowSourceError {
    #[error("Failed to connect to the spreadsheet")]
    ConnectionFailed,
    #[error("Failed to fetch worksheet '{0}'")]
    FetchFailed(String),
}

/// Read-only access to the rows of one worksheet, header row included.
#[async_trait::async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(
        &self,
        worksheet: &str,
    ) -> error_stack::Result<Vec<Vec<String>>, RowSourceError>;
}
