// Centralized configuration for the page info service
// Built once from the environment and passed into the resolver

use std::env;
use std::path::PathBuf;

/// Graph API version used for page lookups
pub const GRAPH_API_VERSION: &str = "v19.0";

/// Desktop browser user agent for page scraping
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Redirects followed when fetching pages and favicons
pub const MAX_REDIRECTS: usize = 3;

/// Audit records kept in the JSON log
pub const AUDIT_JSON_CAP: usize = 1000;

/// Per-call timeouts
pub mod timeouts {
    use std::time::Duration;

    pub const GRAPH: Duration = Duration::from_secs(15);
    pub const TOKEN: Duration = Duration::from_secs(10);
    pub const SCRAPE: Duration = Duration::from_secs(10);
    pub const OEMBED: Duration = Duration::from_secs(10);
    pub const FAVICON: Duration = Duration::from_secs(5);
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        }
    }
}

/// Provider endpoints, overridable for local testing
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Graph API root, without version
    pub graph_base: String,
    pub oembed: String,
    pub favicon_service: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graph_base: "https://graph.facebook.com".to_string(),
            oembed: "https://www.facebook.com/plugins/post/oembed.json/".to_string(),
            favicon_service: "https://www.google.com/s2/favicons".to_string(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// Pre-issued app token (FB_APP_TOKEN)
    pub app_token: Option<String>,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub bind_addr: String,
    pub log_dir: PathBuf,
    pub audit_queue_capacity: usize,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            app_token: None,
            app_id: None,
            app_secret: None,
            bind_addr: "0.0.0.0:8080".to_string(),
            log_dir: PathBuf::from("logs"),
            audit_queue_capacity: 256,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Read configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let endpoint_defaults = Endpoints::default();

        Self {
            environment: env_opt("APP_ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or(defaults.environment),
            app_token: env_opt("FB_APP_TOKEN"),
            app_id: env_opt("FACEBOOK_APP_ID"),
            app_secret: env_opt("FACEBOOK_APP_SECRET"),
            bind_addr: env_opt("BIND_ADDR").unwrap_or(defaults.bind_addr),
            log_dir: env_opt("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            audit_queue_capacity: env_opt("AUDIT_QUEUE_CAPACITY")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.audit_queue_capacity),
            endpoints: Endpoints {
                graph_base: env_opt("GRAPH_API_BASE").unwrap_or(endpoint_defaults.graph_base),
                oembed: env_opt("OEMBED_ENDPOINT").unwrap_or(endpoint_defaults.oembed),
                favicon_service: env_opt("FAVICON_SERVICE")
                    .unwrap_or(endpoint_defaults.favicon_service),
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Client for HTML pages and favicons
    pub fn page_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .cookie_store(true)
            .build()
    }

    /// Client for JSON provider APIs
    pub fn api_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; CreativePreview/1.0)")
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .build()
    }
}

/// Non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
