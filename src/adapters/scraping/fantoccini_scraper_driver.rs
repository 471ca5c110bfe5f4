use std::fmt;
use std::process::Child;
use std::sync::Mutex;

use error_stack::{report, ResultExt};
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tokio::time::Instant;
use tracing::instrument;

use super::scraper_driver::{random_port, spawn_driver_process, ScraperDriverError};
use crate::adapters::config::webdriver_config::WebDriverConfig;

/// A WebDriver session, plus the driver process when we spawned it ourselves.
pub struct FantocciniScraperDriver {
    driver_process: Mutex<Option<Child>>,
    pub client: Client,
}

impl fmt::Debug for FantocciniScraperDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FantocciniScraperDriver").finish()
    }
}

pub fn capabilities(config: &WebDriverConfig) -> Capabilities {
    let mut capabilities = Capabilities::new();
    if config.headless {
        if config.is_chromedriver() {
            capabilities.insert(
                "goog:chromeOptions".to_string(),
                json!({ "args": ["--headless=new"] }),
            );
        } else {
            capabilities.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": ["-headless"] }),
            );
        }
    }
    capabilities
}

#[instrument(skip(config))]
async fn create_and_configure_client(
    config: &WebDriverConfig,
    url: &str,
) -> error_stack::Result<Client, ScraperDriverError> {
    let deadline = Instant::now() + config.wait_timeout();

    // A freshly spawned driver needs a moment before it accepts sessions
    let client = loop {
        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(config));
        match builder.connect(url).await {
            Ok(client) => break client,
            Err(error) if Instant::now() < deadline => {
                tracing::trace!("WebDriver not ready yet: {}", error);
                tokio::time::sleep(config.poll_interval()).await;
            }
            Err(error) => {
                return Err(report!(ScraperDriverError::FailedToCreateClient)
                    .attach_printable(format!(
                        "Failed to connect to WebDriver at {}: {}",
                        url, error
                    )));
            }
        }
    };

    if let Some(user_agent) = config.user_agent.as_deref() {
        client
            .set_ua(user_agent)
            .await
            .change_context(ScraperDriverError::FailedToCreateClient)?;
    }

    Ok(client)
}

impl FantocciniScraperDriver {
    #[instrument(name = "FantocciniScraperDriver::new", skip(config))]
    pub async fn new(config: &WebDriverConfig) -> error_stack::Result<Self, ScraperDriverError> {
        if let Some(url) = config.url.as_deref() {
            tracing::debug!(url, "Connecting to running WebDriver");
            return Ok(FantocciniScraperDriver {
                driver_process: Mutex::new(None),
                client: create_and_configure_client(config, url).await?,
            });
        }

        let port = random_port();
        let mut process = spawn_driver_process(config, port)?;
        tracing::debug!(port, pid = process.id(), "Spawned WebDriver process");

        match create_and_configure_client(config, &format!("http://localhost:{}", port)).await {
            Ok(client) => Ok(FantocciniScraperDriver {
                driver_process: Mutex::new(Some(process)),
                client,
            }),
            Err(report) => {
                if let Err(error) = process.kill() {
                    tracing::error!("Failed to kill WebDriver process: {}", error);
                }
                Err(report)
            }
        }
    }

    fn kill_process(&self) {
        let process = match self.driver_process.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(mut process) = process {
            process.kill().unwrap_or_else(|error| {
                tracing::error!("Failed to kill WebDriver process: {}", error)
            });
            let _ = process.wait();
        }
    }

    #[instrument]
    pub async fn close(&self) {
        self.client.clone().close().await.unwrap_or_else(|error| {
            tracing::error!("Failed to close WebDriver client: {}", error)
        });

        self.kill_process();
    }
}

impl Drop for FantocciniScraperDriver {
    fn drop(&mut self) {
        self.kill_process();
    }
}
