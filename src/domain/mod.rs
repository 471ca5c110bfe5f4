pub mod integration;
pub mod matching;
pub mod post_vars;
pub mod report;
pub mod row_filter;
pub mod sheets;
pub mod worksheet;
