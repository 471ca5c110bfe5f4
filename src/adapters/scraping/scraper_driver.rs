use std::process::{Child, Command};

use error_stack::ResultExt;
use thiserror::Error;
use tracing::instrument;

use crate::adapters::config::webdriver_config::WebDriverConfig;

#[derive(Debug, Error)]
pub enum ScraperDriverError {
    #[error("Failed to spawn WebDriver process")]
    FailedToSpawnDriver,
    #[error("Failed to create client for WebDriver")]
    FailedToCreateClient,
}

pub fn random_port() -> u16 {
    rand::random::<u16>() % (65535 - 1024) + 1024
}

pub fn driver_args(config: &WebDriverConfig, port: u16) -> Vec<String> {
    if config.is_chromedriver() {
        vec![format!("--port={}", port), "--log-level=SEVERE".to_string()]
    } else {
        vec![
            "--port".to_string(),
            port.to_string(),
            "--log".to_string(),
            "fatal".to_string(),
        ]
    }
}

#[instrument(skip(config), fields(binary = %config.binary))]
pub fn spawn_driver_process(
    config: &WebDriverConfig,
    port: u16,
) -> error_stack::Result<Child, ScraperDriverError> {
    Command::new(config.binary.as_ref())
        .args(driver_args(config, port))
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .change_context(ScraperDriverError::FailedToSpawnDriver)
        .attach_printable_lazy(|| format!("Is '{}' installed and on PATH?", config.binary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_port_is_unprivileged() {
        for _ in 0..1000 {
            assert!(random_port() >= 1024);
        }
    }

    #[test]
    fn test_geckodriver_args() {
        let config = WebDriverConfig::default();
        assert_eq!(driver_args(&config, 4444), vec!["--port", "4444", "--log", "fatal"]);
    }

    #[test]
    fn test_chromedriver_args() {
        let config = WebDriverConfig {
            binary: "./chromedriver".into(),
            ..Default::default()
        };
        assert_eq!(driver_args(&config, 9515)[0], "--port=9515");
    }
}
