// Page info resolver
// Ordered fallback chain: Graph API -> scraping -> oEmbed -> URL parsing,
// then the website domain as a last resort

use std::sync::Arc;

use anyhow::Result as AnyResult;
use tracing::{info, warn};

use crate::api::{favicon, graph, oembed, scrape};
use crate::error::{ResolveError, Result};
use crate::models::page_info::{PageInfo, ResolveMethod};
use crate::utils::config::Config;
use crate::utils::formatters::{brand_name_from_domain, humanize_slug};
use crate::utils::page_url::{identifier_from_url, looks_like_username, parse_loose};

/// Audit context for a fallback after page strategies failed
pub const CONTEXT_DOMAIN_FALLBACK: &str = "domain_fallback";
/// Audit context when no page URL was supplied at all
pub const CONTEXT_WEBSITE_ONLY: &str = "website_only";

/// One page-specific resolution method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    GraphApi,
    OpenGraphScraping,
    OEmbed,
    UrlParsing,
}

impl Strategy {
    /// Priority order
    pub const ALL: [Strategy; 4] = [
        Strategy::GraphApi,
        Strategy::OpenGraphScraping,
        Strategy::OEmbed,
        Strategy::UrlParsing,
    ];

    /// Prefix used in error lists
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::GraphApi => "Graph API",
            Strategy::OpenGraphScraping => "Open Graph scraping",
            Strategy::OEmbed => "oEmbed API",
            Strategy::UrlParsing => "URL parsing",
        }
    }
}

/// Successful resolution plus its audit context
#[derive(Debug, Clone)]
pub struct Resolution {
    pub info: PageInfo,
    pub context: Option<&'static str>,
}

pub struct PageInfoResolver {
    config: Arc<Config>,
    /// Browser-like client for pages and favicons
    page_client: reqwest::Client,
    /// JSON client for Graph and oEmbed
    api_client: reqwest::Client,
    strategies: Vec<Strategy>,
}

impl PageInfoResolver {
    pub fn new(config: Arc<Config>) -> AnyResult<Self> {
        Ok(Self {
            page_client: config.page_client()?,
            api_client: config.api_client()?,
            config,
            strategies: Strategy::ALL.to_vec(),
        })
    }

    /// Replace the page strategy order
    #[allow(dead_code)]
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Resolve a page URL, falling back to the website domain
    ///
    /// Fails only when every strategy, including the domain fallback when a
    /// website URL is given, has failed.
    pub async fn resolve(&self, page_url: &str, website_url: Option<&str>) -> Result<Resolution> {
        let page_url = page_url.trim();
        let website_url = website_url.map(str::trim).filter(|w| !w.is_empty());

        if page_url.is_empty() {
            let Some(website) = website_url else {
                return Err(ResolveError::invalid("Facebook URL is required"));
            };
            let mut info = self.domain_fallback(website).await?;
            info.fallback_reason = Some("No Facebook URL provided".to_string());
            return Ok(Resolution {
                info,
                context: Some(CONTEXT_WEBSITE_ONLY),
            });
        }

        let mut errors = Vec::new();

        for strategy in &self.strategies {
            match self.run(*strategy, page_url).await {
                Ok(info) if info.has_name() => {
                    info!("Resolved {} via {}", page_url, info.method.as_str());
                    return Ok(Resolution {
                        info,
                        context: None,
                    });
                }
                Ok(_) => {
                    warn!("{} returned no page name for {}", strategy.label(), page_url);
                    errors.push(format!("{}: no page name returned", strategy.label()));
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", strategy.label(), page_url, e);
                    errors.push(format!("{}: {}", strategy.label(), e));
                }
            }
        }

        if let Some(website) = website_url {
            match self.domain_fallback(website).await {
                Ok(mut info) => {
                    info!("Resolved {} via domain fallback ({})", page_url, website);
                    info.fallback_reason =
                        Some(format!("All Facebook methods failed: {}", errors.join("; ")));
                    return Ok(Resolution {
                        info,
                        context: Some(CONTEXT_DOMAIN_FALLBACK),
                    });
                }
                Err(e) => {
                    warn!("Domain fallback failed for {}: {}", website, e);
                    errors.push(format!("Domain fallback: {}", e));
                }
            }
        }

        Err(ResolveError::AllStrategiesExhausted(errors))
    }

    /// Run a single page strategy
    pub async fn run(&self, strategy: Strategy, page_url: &str) -> Result<PageInfo> {
        match strategy {
            Strategy::GraphApi => graph::lookup_page(&self.api_client, &self.config, page_url).await,
            Strategy::OpenGraphScraping => scrape::scrape_page(&self.page_client, page_url).await,
            Strategy::OEmbed => oembed::fetch_oembed(&self.api_client, &self.config, page_url).await,
            Strategy::UrlParsing => info_from_url(page_url, &self.config.endpoints.graph_base),
        }
    }

    /// Brand name and favicon from a website URL
    pub async fn domain_fallback(&self, website_url: &str) -> Result<PageInfo> {
        let website = parse_loose(website_url)
            .ok_or_else(|| ResolveError::invalid("Invalid website URL for fallback"))?;
        let host = website
            .host_str()
            .ok_or_else(|| ResolveError::invalid("Invalid website URL for fallback"))?;

        let domain = host.strip_prefix("www.").unwrap_or(host).to_string();
        let name = brand_name_from_domain(&domain);
        if name.is_empty() {
            return Err(ResolveError::invalid("Invalid website URL for fallback"));
        }

        let picture = favicon::find_favicon(&self.page_client, &self.config, &website, &domain).await;

        Ok(PageInfo {
            picture,
            domain: Some(domain),
            ..PageInfo::new(name, website_url, ResolveMethod::DomainFallback)
        })
    }
}

/// Name and conventional picture URL from the page URL alone
pub fn info_from_url(page_url: &str, graph_base: &str) -> Result<PageInfo> {
    let identifier = identifier_from_url(page_url)
        .ok_or_else(|| ResolveError::invalid("Invalid Facebook URL format"))?;

    let name = if looks_like_username(&identifier) {
        identifier.clone()
    } else {
        humanize_slug(&identifier, &['.', '_'])
    };

    Ok(PageInfo {
        picture: Some(format!(
            "{}/{}/picture?type=large",
            graph_base,
            urlencoding::encode(&identifier)
        )),
        note: Some("Username extracted from URL - may not be actual page name".to_string()),
        ..PageInfo::new(name, page_url, ResolveMethod::UrlParsing)
    })
}
