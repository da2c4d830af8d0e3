// Favicon probing for the domain fallback

use tracing::debug;
use url::Url;

use crate::utils::config::{timeouts, Config};

/// Favicon URL for a website, or None when nothing answers 200
///
/// Tries the favicon service first, then `{scheme}://{host}/favicon.ico`.
pub async fn find_favicon(
    client: &reqwest::Client,
    config: &Config,
    website: &Url,
    domain: &str,
) -> Option<String> {
    let service_url = format!(
        "{}?sz=64&domain={}",
        config.endpoints.favicon_service,
        urlencoding::encode(domain)
    );
    if probe(client, &service_url).await {
        return Some(service_url);
    }

    let direct_url = match website.port() {
        Some(port) => format!("{}://{}:{}/favicon.ico", website.scheme(), domain, port),
        None => format!("{}://{}/favicon.ico", website.scheme(), domain),
    };
    if probe(client, &direct_url).await {
        return Some(direct_url);
    }

    None
}

/// True only for a 200 response
async fn probe(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).timeout(timeouts::FAVICON).send().await {
        Ok(response) => response.status() == reqwest::StatusCode::OK,
        Err(e) => {
            debug!("Favicon probe {} failed: {}", url, e);
            false
        }
    }
}
