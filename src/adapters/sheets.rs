pub mod auth;
pub mod cell_values;
pub mod http_client;
pub mod spreadsheet_manager;
pub mod spreadsheet_read;
