use std::collections::BTreeMap;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use error_stack::{report, ResultExt};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use super::sheets_config::SpreadsheetConfig;
use super::tenant_config::TenantConfig;
use super::webdriver_config::WebDriverConfig;

pub const DEFAULT_CONFIG_PATH: &str = "Config";
pub const DOTENV_FILE: &str = "login.env";
pub const ENV_PREFIX: &str = "LISTFLEX_SYNC";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config file '{0}'")]
    Unreadable(String),
    #[error("Failed to deserialize config, field path: {0}")]
    Invalid(String),
    #[error("Unknown tenant '{0}'")]
    UnknownTenant(String),
    #[error("Missing {0} credential")]
    MissingCredential(&'static str),
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SpreadsheetConfig,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub tenants: BTreeMap<String, TenantConfig>,
}

fn environment() -> Environment {
    // Values stay strings; typed fields are coerced on deserialization, so a
    // numeric password is still a string
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

impl AppConfig {
    /// Loads `login.env` (if present), then layers the `Config` file (or
    /// `$CONFIG_PATH`) and `LISTFLEX_SYNC__*` environment variables.
    #[instrument(name = "AppConfig::load")]
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        if let Err(error) = dotenvy::from_filename(DOTENV_FILE) {
            tracing::debug!("{} not loaded: {}", DOTENV_FILE, error);
        }

        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut builder = Config::builder()
            .add_source(File::with_name(&config_path).required(false))
            .add_source(environment());

        // Variable used by the original login.env files
        if let Ok(spreadsheet_id) = std::env::var("GOOGLE_SHEET_ID") {
            builder = builder
                .set_default("sheets.spreadsheet_id", spreadsheet_id)
                .change_context_lazy(|| ConfigError::Unreadable(config_path.clone()))?;
        }

        Self::from_builder(builder, &config_path)
    }

    fn from_builder(
        builder: ConfigBuilder<DefaultState>,
        origin: &str,
    ) -> error_stack::Result<Self, ConfigError> {
        let config = builder
            .build()
            .change_context_lazy(|| ConfigError::Unreadable(origin.to_owned()))?;

        Self::deserialize_from(config)
            .attach_printable_lazy(|| format!("Config file: {}", origin))
            .attach_printable("Make sure all required fields are present in the configuration file.")
    }

    /// Deserializes from any source, reporting the path of the offending field.
    pub fn deserialize_from<'de, D>(source: D) -> error_stack::Result<Self, ConfigError>
    where
        D: serde::Deserializer<'de>,
    {
        serde_path_to_error::deserialize(source).map_err(|error| {
            let path = error.path().to_string();
            report!(ConfigError::Invalid(path)).attach_printable(error.into_inner().to_string())
        })
    }

    pub fn tenant(&self, name: &str) -> error_stack::Result<&TenantConfig, ConfigError> {
        self.tenants
            .get(name)
            .or_else(|| {
                self.tenants
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, tenant)| tenant)
            })
            .ok_or_else(|| report!(ConfigError::UnknownTenant(name.to_owned())))
            .attach_printable_lazy(|| {
                format!(
                    "Configured tenants: {}",
                    self.tenants.keys().cloned().collect::<Vec<_>>().join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;
    use crate::domain::matching::MatchPolicy;
    use crate::domain::worksheet::WorksheetSelector;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "sheets": { "spreadsheet_id": "sheet-123" },
            "tenants": {
                "data": {
                    "base_url": "https://data.listflex.com",
                    "client_id": 420,
                    "username_env": "LISTFLEX_USERNAME_DATA",
                    "password_env": "LISTFLEX_PASSWORD_DATA",
                    "worksheet": { "kind": "next_month", "suffix": " 25 NEW NEW" },
                },
                "monumental": {
                    "base_url": "https://monumental.listflex.com",
                    "client_id": 420,
                    "match_policy": "all",
                    "worksheet": { "kind": "fixed", "name": "MARCH 25 - OG" },
                },
            },
        })
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config = AppConfig::deserialize_from(sample()).unwrap();

        assert_eq!(config.sheets.priv_key.as_ref(), "google_sheets_credentials.json");
        assert_eq!(config.webdriver.binary.as_ref(), "geckodriver");
        assert_eq!(config.webdriver.wait_timeout_ms, 15_000);
        assert_eq!(config.tenants.len(), 2);
    }

    #[test]
    fn test_tenant_lookup() {
        let config = AppConfig::deserialize_from(sample()).unwrap();

        let monumental = config.tenant("Monumental").unwrap();
        assert_eq!(monumental.match_policy, MatchPolicy::All);
        assert_eq!(
            monumental.worksheet,
            WorksheetSelector::Fixed {
                name: "MARCH 25 - OG".into()
            }
        );

        let report = config.tenant("nope").unwrap_err();
        assert!(matches!(
            report.current_context(),
            ConfigError::UnknownTenant(name) if name == "nope"
        ));
    }

    #[test]
    fn test_invalid_config_reports_field_path() {
        let mut value = sample();
        value["tenants"]["data"]["client_id"] = serde_json::json!("not a number");

        let report = AppConfig::deserialize_from(value).unwrap_err();
        match report.current_context() {
            ConfigError::Invalid(path) => assert_eq!(path, "tenants.data.client_id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_section_reports_field_path() {
        let report = AppConfig::deserialize_from(serde_json::json!({ "tenants": {} })).unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::Invalid(_)));
    }

    const TOML: &str = r#"
[sheets]
spreadsheet_id = "sheet-123"

[tenants.data]
base_url = "https://data.listflex.com"
client_id = 420
username = "operator"
worksheet = { kind = "fixed", name = "MARCH 25 - OG" }
"#;

    fn load_with_env(vars: &[(&str, &str)]) -> error_stack::Result<AppConfig, ConfigError> {
        let env = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<config::Map<String, String>>();
        let builder = Config::builder()
            .add_source(File::from_str(TOML, FileFormat::Toml))
            .add_source(environment().source(Some(env)));
        AppConfig::from_builder(builder, "inline")
    }

    #[test]
    fn test_numeric_env_values_stay_strings() {
        let config = load_with_env(&[
            ("LISTFLEX_SYNC__TENANTS__DATA__PASSWORD", "123456"),
            ("LISTFLEX_SYNC__SHEETS__SPREADSHEET_ID", "0123456"),
        ])
        .unwrap();

        let data = config.tenant("data").unwrap();
        assert_eq!(data.password.as_deref(), Some("123456"));
        assert_eq!(data.credentials().unwrap().password, "123456");
        assert_eq!(config.sheets.spreadsheet_id.as_ref(), "0123456");
    }

    #[test]
    fn test_env_overrides_numeric_fields() {
        let config = load_with_env(&[("LISTFLEX_SYNC__TENANTS__DATA__CLIENT_ID", "421")]).unwrap();
        assert_eq!(config.tenant("data").unwrap().client_id, 421);
    }
}
