// Service features
pub mod audit_log;
pub mod resolver;
