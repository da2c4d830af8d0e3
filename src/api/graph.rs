// Facebook Graph API client
// Page lookup with app access token (env token or client-credentials exchange)

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ResolveError, Result};
use crate::models::page_info::{PageInfo, ResolveMethod};
use crate::utils::config::{timeouts, Config, GRAPH_API_VERSION};
use crate::utils::page_url::derive_page_identifier;

const PAGE_FIELDS: &str = "id,name,link,picture.type(large){url}";

/// Identifier answered locally in development mode
const DEV_STUB_IDENTIFIER: &str = "nike";

/// Fixed development record, never returned in production
fn dev_stub() -> PageInfo {
    PageInfo {
        page_id: Some("15087023444".to_string()),
        picture: Some(
            "https://scontent-lax3-2.xx.fbcdn.net/v/t39.30808-1/\
             347632633_806437687574050_5273940193516970644_n.jpg"
                .to_string(),
        ),
        ..PageInfo::new("Nike", "https://www.facebook.com/nike/", ResolveMethod::GraphApiTest)
    }
}

/// Obtain an app access token
///
/// Prefers the configured token; otherwise exchanges app id/secret.
/// Returns None when neither is available or the exchange fails.
pub async fn get_app_access_token(client: &reqwest::Client, config: &Config) -> Option<String> {
    if let Some(token) = &config.app_token {
        return Some(token.clone());
    }

    let (Some(app_id), Some(app_secret)) = (&config.app_id, &config.app_secret) else {
        return None;
    };

    let response = client
        .get(format!("{}/oauth/access_token", config.endpoints.graph_base))
        .query(&[
            ("client_id", app_id.as_str()),
            ("client_secret", app_secret.as_str()),
            ("grant_type", "client_credentials"),
        ])
        .timeout(timeouts::TOKEN)
        .send()
        .await;

    let response = match response {
        Ok(r) => r,
        Err(e) => {
            warn!("Token exchange request failed: {}", e.without_url());
            return None;
        }
    };

    match response.json::<TokenResponse>().await {
        Ok(data) => data.access_token.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!("Token exchange returned unreadable body: {}", e);
            None
        }
    }
}

/// Look up a page through the Graph API
pub async fn lookup_page(
    client: &reqwest::Client,
    config: &Config,
    page_url: &str,
) -> Result<PageInfo> {
    let identifier = derive_page_identifier(page_url)
        .ok_or_else(|| ResolveError::invalid("Unable to parse Page identifier from URL"))?;

    if config.is_development() && identifier == DEV_STUB_IDENTIFIER {
        debug!("Serving development stub for {}", identifier);
        return Ok(dev_stub());
    }

    let token = get_app_access_token(client, config)
        .await
        .ok_or_else(|| ResolveError::upstream("No app access token available"))?;

    let response = client
        .get(format!(
            "{}/{}/{}",
            config.endpoints.graph_base,
            GRAPH_API_VERSION,
            urlencoding::encode(&identifier)
        ))
        .query(&[("fields", PAGE_FIELDS), ("access_token", token.as_str())])
        .timeout(timeouts::GRAPH)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    let data: GraphResponse = serde_json::from_str(&body)
        .map_err(|_| ResolveError::parse("Invalid JSON response from Facebook API"))?;

    if let Some(error) = data.error {
        let msg = error
            .message
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(ResolveError::upstream(format!("Facebook API error: {}", msg)));
    }

    if !status.is_success() {
        return Err(ResolveError::upstream(format!(
            "Facebook API error: HTTP {}",
            status.as_u16()
        )));
    }

    let picture = data
        .picture
        .and_then(|p| p.data)
        .and_then(|d| d.url)
        .filter(|u| !u.is_empty());

    Ok(PageInfo {
        page_id: data.id.filter(|id| !id.is_empty()),
        picture,
        ..PageInfo::new(
            data.name.unwrap_or_default(),
            data.link.unwrap_or_else(|| page_url.to_string()),
            ResolveMethod::GraphApi,
        )
    })
}

// Graph API response structures
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    id: Option<String>,
    name: Option<String>,
    link: Option<String>,
    picture: Option<GraphPicture>,
    error: Option<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphPicture {
    data: Option<GraphPictureData>,
}

#[derive(Debug, Deserialize)]
struct GraphPictureData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: Option<String>,
}
