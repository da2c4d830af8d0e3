// Data models
pub mod attempt_log;
pub mod page_info;
