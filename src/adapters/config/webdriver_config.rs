use std::time::Duration;

fn default_binary() -> Box<str> {
    "geckodriver".into()
}

fn default_wait_timeout_ms() -> u64 {
    15_000
}

fn default_poll_interval_ms() -> u64 {
    250
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct WebDriverConfig {
    /// `geckodriver` or `chromedriver`, spawned on a random port.
    #[serde(default = "default_binary")]
    pub binary: Box<str>,
    /// Connect to an already running WebDriver instead of spawning one.
    #[serde(default)]
    pub url: Option<Box<str>>,
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub user_agent: Option<Box<str>>,
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl WebDriverConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn is_chromedriver(&self) -> bool {
        self.binary.contains("chromedriver")
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            url: None,
            headless: false,
            user_agent: None,
            wait_timeout_ms: default_wait_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
