use std::fmt;

use error_stack::{report, ResultExt};

use super::app_config::ConfigError;
use crate::domain::matching::{MatchPolicy, DEFAULT_EXCLUSION_TOKEN};
use crate::domain::worksheet::WorksheetSelector;
use crate::ports::session_driver::Credentials;

fn default_exclusion_token() -> Box<str> {
    DEFAULT_EXCLUSION_TOKEN.into()
}

/// One Listflex admin console and the sheet tab that drives it.
///
/// Credentials are given either inline (`username`/`password`) or as the names
/// of environment variables holding them (`username_env`/`password_env`).
#[derive(serde::Deserialize, Clone)]
pub struct TenantConfig {
    pub base_url: Box<str>,
    pub client_id: u32,
    #[serde(default)]
    pub username: Option<Box<str>>,
    #[serde(default)]
    pub password: Option<Box<str>>,
    #[serde(default)]
    pub username_env: Option<Box<str>>,
    #[serde(default)]
    pub password_env: Option<Box<str>>,
    #[serde(default)]
    pub match_policy: MatchPolicy,
    #[serde(default = "default_exclusion_token")]
    pub exclusion_token: Box<str>,
    pub worksheet: WorksheetSelector,
}

impl fmt::Debug for TenantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("match_policy", &self.match_policy)
            .field("exclusion_token", &self.exclusion_token)
            .field("worksheet", &self.worksheet)
            .finish_non_exhaustive()
    }
}

fn resolve_secret(
    inline: Option<&str>,
    env_var: Option<&str>,
    what: &'static str,
) -> error_stack::Result<String, ConfigError> {
    if let Some(value) = inline.filter(|value| !value.is_empty()) {
        return Ok(value.to_owned());
    }

    let env_var = env_var.ok_or_else(|| report!(ConfigError::MissingCredential(what)))?;
    std::env::var(env_var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| report!(ConfigError::MissingCredential(what)))
        .attach_printable_lazy(|| format!("Environment variable {} is not set", env_var))
}

impl TenantConfig {
    pub fn credentials(&self) -> error_stack::Result<Credentials, ConfigError> {
        Ok(Credentials {
            username: resolve_secret(
                self.username.as_deref(),
                self.username_env.as_deref(),
                "username",
            )?,
            password: resolve_secret(
                self.password.as_deref(),
                self.password_env.as_deref(),
                "password",
            )?,
        })
    }

    pub fn login_url(&self) -> String {
        format!(
            "{}/lmadmin/login.php?r=plzlogin",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn integrations_url(&self) -> String {
        format!(
            "{}/lmadmin/client_integrations.php?client_id={}",
            self.base_url.trim_end_matches('/'),
            self.client_id
        )
    }
}
