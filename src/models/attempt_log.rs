// Resolution attempt audit record
// One per resolve call, written to the CSV and JSON audit files

use serde::{Deserialize, Serialize};

use super::page_info::PageInfo;

/// Column headers for the CSV audit file
pub const CSV_HEADER: [&str; 10] = [
    "Timestamp",
    "Status",
    "Context",
    "Page ID",
    "Name",
    "Picture URL",
    "Page URL",
    "Method",
    "Error",
    "IP Address",
];

/// A single audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionAttemptLog {
    pub timestamp: String,
    pub success: bool,
    pub context: Option<String>,
    pub page_id: String,
    pub name: String,
    pub picture: String,
    pub url: String,
    pub method: String,
    pub error: Option<String>,
    pub ip: String,
}

impl ResolutionAttemptLog {
    /// Entry for a call that produced a PageInfo
    pub fn success(info: &PageInfo, context: Option<&str>, ip: &str) -> Self {
        Self {
            timestamp: now_string(),
            success: true,
            context: context.map(String::from),
            page_id: info.page_id.clone().unwrap_or_default(),
            name: info.name.clone(),
            picture: info.picture.clone().unwrap_or_default(),
            url: info.url.clone(),
            method: info.method.as_str().to_string(),
            error: None,
            ip: ip.to_string(),
        }
    }

    /// Entry for a call that failed outright
    pub fn failure(url: &str, error: &str, context: Option<&str>, ip: &str) -> Self {
        Self {
            timestamp: now_string(),
            success: false,
            context: context.map(String::from),
            page_id: String::new(),
            name: String::new(),
            picture: String::new(),
            url: url.to_string(),
            method: "unknown".to_string(),
            error: Some(error.to_string()),
            ip: ip.to_string(),
        }
    }

    /// Row values in CSV_HEADER order
    pub fn csv_row(&self) -> [&str; 10] {
        [
            &self.timestamp,
            if self.success { "SUCCESS" } else { "FAILED" },
            self.context.as_deref().unwrap_or(""),
            &self.page_id,
            &self.name,
            &self.picture,
            &self.url,
            &self.method,
            self.error.as_deref().unwrap_or(""),
            &self.ip,
        ]
    }
}

fn now_string() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
