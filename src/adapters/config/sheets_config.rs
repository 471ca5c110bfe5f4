fn default_priv_key() -> Box<str> {
    "google_sheets_credentials.json".into()
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Path to the service account key file.
    #[serde(default = "default_priv_key")]
    pub priv_key: Box<str>,
    pub spreadsheet_id: Box<str>,
}
