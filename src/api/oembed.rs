// Facebook oEmbed client
// Author name only; oEmbed never carries a profile picture

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ResolveError, Result};
use crate::models::page_info::{PageInfo, ResolveMethod};
use crate::utils::config::{timeouts, Config};
use crate::utils::formatters::humanize_slug;
use crate::utils::page_url::is_facebook_url;

static DATA_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-href="[^"]*facebook\.com/([^"/]+)"#).unwrap());

/// oEmbed payload fields we use
#[derive(Debug, Default, Deserialize)]
pub struct OEmbedResponse {
    pub author_name: Option<String>,
    pub html: Option<String>,
    pub url: Option<String>,
}

/// Fetch page info from the oEmbed endpoint
pub async fn fetch_oembed(
    client: &reqwest::Client,
    config: &Config,
    page_url: &str,
) -> Result<PageInfo> {
    if !is_facebook_url(page_url) {
        return Err(ResolveError::invalid("Not a Facebook URL"));
    }

    let response = client
        .get(&config.endpoints.oembed)
        .query(&[("url", page_url)])
        .timeout(timeouts::OEMBED)
        .send()
        .await
        .map_err(|_| ResolveError::upstream("Could not fetch oEmbed info"))?;

    if !response.status().is_success() {
        return Err(ResolveError::upstream(format!(
            "Could not fetch oEmbed info (HTTP {})",
            response.status().as_u16()
        )));
    }

    let body = response.text().await?;
    let data: OEmbedResponse = serde_json::from_str(&body)
        .map_err(|_| ResolveError::parse("Invalid response from Facebook oEmbed"))?;

    Ok(PageInfo::new(
        author_name(&data).unwrap_or_default(),
        data.url.clone().unwrap_or_else(|| page_url.to_string()),
        ResolveMethod::OembedApi,
    ))
}

/// `author_name`, else a slug from the embed HTML's data-href
pub fn author_name(data: &OEmbedResponse) -> Option<String> {
    if let Some(name) = data.author_name.as_deref().map(str::trim) {
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    let html = data.html.as_deref()?;
    let slug = DATA_HREF.captures(html)?.get(1)?.as_str();
    Some(humanize_slug(slug, &['-', '_', '.']))
}
