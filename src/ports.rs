pub mod routine;
pub mod row_source;
pub mod session_driver;
