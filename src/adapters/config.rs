pub mod app_config;
pub mod sheets_config;
pub mod tenant_config;
pub mod webdriver_config;
