//! Stateless render operations over an arbitrary page: screenshot,
//! PDF, content digest. No session state, no cookies.

use std::time::Duration;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use gramprobe_core::{ContentDigest, PageSession, ScrapeError};

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Accept only http/https, defaulting to https when the scheme is
/// omitted. Runs before any navigation.
pub fn normalize_url(raw: &str) -> Result<String, ScrapeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::InvalidInput("url is required".to_string()));
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed =
        Url::parse(&candidate).map_err(|e| ScrapeError::InvalidInput(format!("invalid url: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(String::from(parsed)),
        other => Err(ScrapeError::InvalidInput(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}

pub async fn screenshot(
    session: &dyn PageSession,
    url: &str,
    full_page: bool,
    nav_timeout: Duration,
) -> Result<Vec<u8>, ScrapeError> {
    let url = normalize_url(url)?;
    session.navigate(&url, nav_timeout).await?;
    let png = session.screenshot(full_page)?;
    debug!(url, bytes = png.len(), "screenshot captured");
    Ok(png)
}

pub async fn pdf(
    session: &dyn PageSession,
    url: &str,
    nav_timeout: Duration,
) -> Result<Vec<u8>, ScrapeError> {
    let url = normalize_url(url)?;
    session.navigate(&url, nav_timeout).await?;
    let bytes = session.pdf()?;
    debug!(url, bytes = bytes.len(), "pdf rendered");
    Ok(bytes)
}

pub async fn digest(
    session: &dyn PageSession,
    url: &str,
    nav_timeout: Duration,
) -> Result<ContentDigest, ScrapeError> {
    let url = normalize_url(url)?;
    session.navigate(&url, nav_timeout).await?;
    let html = session.content()?;
    Ok(content_digest(&html))
}

/// Pure digest over one snapshot.
pub fn content_digest(html: &str) -> ContentDigest {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let heading = doc
        .select(&H1)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "No heading".to_string());
    let description = doc
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
        .unwrap_or_else(|| "No description".to_string());

    ContentDigest {
        title,
        heading,
        description,
        paragraphs: doc.select(&PARAGRAPHS).count(),
        links: doc.select(&ANCHORS).count(),
    }
}
