// Page info data model
// The record returned to the creative builder for a social page

use serde::{Deserialize, Serialize};

/// Which strategy produced a PageInfo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMethod {
    GraphApi,
    GraphApiTest,
    OpenGraphScraping,
    OembedApi,
    UrlParsing,
    DomainFallback,
}

impl ResolveMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveMethod::GraphApi => "graph_api",
            ResolveMethod::GraphApiTest => "graph_api_test",
            ResolveMethod::OpenGraphScraping => "open_graph_scraping",
            ResolveMethod::OembedApi => "oembed_api",
            ResolveMethod::UrlParsing => "url_parsing",
            ResolveMethod::DomainFallback => "domain_fallback",
        }
    }
}

/// Resolved page branding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Graph API page id, when known
    #[serde(rename = "pageid", skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub url: String,
    pub method: ResolveMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Bare website domain (domain fallback only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl PageInfo {
    /// Minimal record; optional fields are filled in by the caller
    pub fn new(name: impl Into<String>, url: impl Into<String>, method: ResolveMethod) -> Self {
        Self {
            page_id: None,
            name: name.into(),
            picture: None,
            url: url.into(),
            method,
            description: None,
            domain: None,
            note: None,
            fallback_reason: None,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
