pub mod fantoccini_scraper_driver;
pub mod listflex_selectors;
pub mod listflex_session;
pub mod scraper_driver;
pub mod webdriver_extensions;
