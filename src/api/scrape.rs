// Open Graph scraping of a Facebook page
// Mobile host first (richer meta tags), original URL on fetch failure

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::models::page_info::{PageInfo, ResolveMethod};
use crate::utils::config::timeouts;
use crate::utils::formatters::strip_facebook_suffix;
use crate::utils::page_url::{is_facebook_url, mobile_url};

/// Raw-markup title patterns, tried in order when no meta tags parse
static TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)<title[^>]*>([^<]+)</title>",
        r#"pageTitle["']:\s*["']([^"']+)["']"#,
        r#"og:title["']?\s*content=["']([^"']+)["']"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Metadata pulled out of a page's markup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedMeta {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Scrape page info from a Facebook URL
pub async fn scrape_page(client: &reqwest::Client, page_url: &str) -> Result<PageInfo> {
    if !is_facebook_url(page_url) {
        return Err(ResolveError::invalid("Not a Facebook URL"));
    }

    let mobile = mobile_url(page_url).unwrap_or_else(|| page_url.to_string());
    scrape_from(client, &[mobile.as_str(), page_url], page_url).await
}

/// Fetch the first reachable candidate and extract page info from it
pub async fn scrape_from(
    client: &reqwest::Client,
    candidates: &[&str],
    page_url: &str,
) -> Result<PageInfo> {
    let html = fetch_first(client, candidates).await?;
    page_info_from_html(&html, page_url)
}

/// GET each URL in order, returning the first successful body
pub async fn fetch_first(client: &reqwest::Client, urls: &[&str]) -> Result<String> {
    for url in urls {
        match fetch_html(client, url).await {
            Ok(html) => return Ok(html),
            Err(e) => debug!("Fetch of {} failed ({})", url, e),
        }
    }
    Err(ResolveError::upstream("Could not fetch page content"))
}

/// GET a page body; non-2xx counts as a failed fetch
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).timeout(timeouts::SCRAPE).send().await?;

    if !response.status().is_success() {
        return Err(ResolveError::upstream(format!(
            "HTTP {} fetching {}",
            response.status().as_u16(),
            url
        )));
    }

    Ok(response.text().await?)
}

/// Build a PageInfo from fetched markup
pub fn page_info_from_html(html: &str, page_url: &str) -> Result<PageInfo> {
    let meta = extract_meta(html);

    let name = meta
        .title
        .map(|t| strip_facebook_suffix(&t))
        .unwrap_or_default();

    if name.is_empty() && meta.image.is_none() {
        return Err(ResolveError::parse(
            "Could not extract page information - page may be private or restricted",
        ));
    }

    Ok(PageInfo {
        picture: meta.image,
        description: meta.description,
        ..PageInfo::new(
            name,
            meta.url.unwrap_or_else(|| page_url.to_string()),
            ResolveMethod::OpenGraphScraping,
        )
    })
}

/// Extract Open Graph metadata, falling back to <title> and raw patterns
pub fn extract_meta(html: &str) -> ScrapedMeta {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "og:title")
        .or_else(|| meta_content(&document, "title"))
        .or_else(|| title_text(&document))
        .or_else(|| title_from_markup(html));

    ScrapedMeta {
        title,
        image: meta_content(&document, "og:image"),
        description: meta_content(&document, "og:description"),
        url: meta_content(&document, "og:url"),
    }
}

/// `<meta property=...>` first, then `<meta name=...>`
fn meta_content(document: &Html, key: &str) -> Option<String> {
    ["property", "name"].iter().find_map(|attr| {
        let selector = Selector::parse(&format!(r#"meta[{}="{}"]"#, attr, key)).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    })
}

fn title_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Regex extraction for markup the parser could not make sense of
fn title_from_markup(html: &str) -> Option<String> {
    TITLE_PATTERNS.iter().find_map(|re| {
        let raw = re.captures(html)?.get(1)?.as_str();
        let decoded = html_escape::decode_html_entities(raw);
        let title = strip_facebook_suffix(&decoded);
        (!title.is_empty()).then_some(title)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OG_PAGE: &str = r#"<html><head>
        <title>ignored</title>
        <meta property="og:title" content="Joe's Pizza | Facebook" />
        <meta property="og:image" content="https://cdn.example/joe.jpg" />
        <meta property="og:description" content="Best slices in town" />
        <meta property="og:url" content="https://www.facebook.com/joespizza/" />
    </head><body></body></html>"#;

    #[test]
    fn test_extract_open_graph() {
        let meta = extract_meta(OG_PAGE);
        assert_eq!(meta.title.as_deref(), Some("Joe's Pizza | Facebook"));
        assert_eq!(meta.image.as_deref(), Some("https://cdn.example/joe.jpg"));
        assert_eq!(meta.description.as_deref(), Some("Best slices in town"));
    }

    #[test]
    fn test_page_info_strips_suffix() {
        let info = page_info_from_html(OG_PAGE, "https://facebook.com/joespizza").unwrap();
        assert_eq!(info.name, "Joe's Pizza");
        assert_eq!(info.url, "https://www.facebook.com/joespizza/");
        assert_eq!(info.method, ResolveMethod::OpenGraphScraping);
    }

    #[test]
    fn test_meta_name_and_title_fallbacks() {
        let html = r#"<html><head><meta name="og:title" content="By Name"></head></html>"#;
        assert_eq!(extract_meta(html).title.as_deref(), Some("By Name"));

        let html = "<html><head><title>Corner Cafe  |  Facebook </title></head></html>";
        let info = page_info_from_html(html, "https://facebook.com/cafe").unwrap();
        assert_eq!(info.name, "Corner Cafe");
        assert_eq!(info.url, "https://facebook.com/cafe");
        assert!(info.picture.is_none());
    }

    #[test]
    fn test_markup_pattern_fallback() {
        let html = r#"<script>{"pageTitle": "Lakeside Books &amp; More | Facebook"}</script>"#;
        let meta = extract_meta(html);
        assert_eq!(meta.title.as_deref(), Some("Lakeside Books & More"));
    }

    #[test]
    fn test_nothing_usable() {
        let err = page_info_from_html("<html><body>Log in</body></html>", "https://facebook.com/x")
            .unwrap_err();
        assert!(matches!(err, ResolveError::ParseFailure(_)));
    }

    #[tokio::test]
    async fn test_scrape_skips_non_facebook_urls() {
        let client = reqwest::Client::new();
        let err = scrape_page(&client, "https://example.com/joespizza")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_fetch_first_falls_back_to_next_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mobile"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/desktop"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OG_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let mobile = format!("{}/mobile", server.uri());
        let desktop = format!("{}/desktop", server.uri());

        let html = fetch_first(&client, &[mobile.as_str(), desktop.as_str()]).await.unwrap();
        assert!(html.contains("og:title"));

        let refused = fetch_first(&client, &["http://127.0.0.1:9/m", desktop.as_str()]).await;
        assert!(refused.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_first_all_fail() {
        let client = reqwest::Client::new();
        let err = fetch_first(&client, &["http://127.0.0.1:9/a", "http://127.0.0.1:9/b"])
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::UpstreamUnavailable(_)));
        assert_eq!(err.to_string(), "Could not fetch page content");
    }

    #[tokio::test]
    async fn test_scrape_from_prefers_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/m/joespizza"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OG_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/www/joespizza"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<title>Other</title>"))
            .expect(0)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let mobile = format!("{}/m/joespizza", server.uri());
        let desktop = format!("{}/www/joespizza", server.uri());

        let candidates = [mobile.as_str(), desktop.as_str()];
        let info = scrape_from(&client, &candidates, "https://www.facebook.com/joespizza")
            .await
            .unwrap();
        assert_eq!(info.name, "Joe's Pizza");
        assert_eq!(info.picture.as_deref(), Some("https://cdn.example/joe.jpg"));
        assert_eq!(info.description.as_deref(), Some("Best slices in town"));
        assert_eq!(info.method, ResolveMethod::OpenGraphScraping);
    }

    #[tokio::test]
    async fn test_fetch_html_non_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OG_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let html = fetch_html(&client, &format!("{}/ok", server.uri())).await.unwrap();
        assert!(html.contains("og:title"));

        let err = fetch_html(&client, &format!("{}/gone", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("HTTP 404"));
    }
}
