//! Selector-based field extraction over a single markup snapshot.
//!
//! The selector set is coupled to the target site's current markup and
//! will rot with it; everything site-specific lives in this module so
//! a markup change never touches workflow logic. All functions here
//! are pure: one snapshot in, fields out, no live page queries.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use gramprobe_core::SENTINEL;

/// Marker element whose absence means the account is private.
pub const AVATAR_MARKER: &str = "._aagu";

static HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse("header").unwrap());
static ENGAGEMENT_ITEMS: Lazy<Selector> = Lazy::new(|| Selector::parse("li.x972fbf").unwrap());
static STAT_SPANS: Lazy<Selector> = Lazy::new(|| Selector::parse("span.x5n08af").unwrap());
static BIO_SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span._ap3a").unwrap());
static AVATAR_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"img[alt*="profile picture"]"#).unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct PageFields {
    pub likes: String,
    pub comments: String,
    pub posts: String,
    pub followers: String,
    pub following: String,
    pub bio: String,
    pub profile_picture: String,
}

/// Apply the fixed selector set to one snapshot. Selector misses
/// degrade to sentinels; this never fails.
pub fn page_fields(html: &str) -> PageFields {
    let doc = Html::parse_document(html);
    let header = doc.select(&HEADER).next();

    // first two matching list items, in document order
    let engagement: Vec<String> = doc.select(&ENGAGEMENT_ITEMS).map(|el| text_of(&el)).collect();
    let likes = pick(&engagement, 0);
    let comments = pick(&engagement, 1);

    // stat triplet is all-or-nothing: a partial triple would shift
    // positions and mislabel the counts
    let stats: Vec<String> = header
        .map(|h| h.select(&STAT_SPANS).map(|el| text_of(&el)).collect())
        .unwrap_or_default();
    let (posts, followers, following) = if stats.len() >= 3 {
        (stats[0].clone(), stats[1].clone(), stats[2].clone())
    } else {
        (SENTINEL.into(), SENTINEL.into(), SENTINEL.into())
    };

    let bio = header
        .and_then(|h| h.select(&BIO_SPAN).next())
        .map(|el| text_of(&el))
        .unwrap_or_default();

    let profile_picture = doc
        .select(&AVATAR_IMG)
        .next()
        .and_then(|el| el.value().attr("src"))
        .unwrap_or_default()
        .to_string();

    PageFields {
        likes,
        comments,
        posts,
        followers,
        following,
        bio,
        profile_picture,
    }
}

/// Username is the path segment right after the site's domain marker.
pub fn username_from_url(profile_url: &str, domain: &str) -> String {
    let marker = format!("{domain}/");
    profile_url
        .split_once(&marker)
        .map(|(_, rest)| rest.split(['/', '?', '#']).next().unwrap_or(""))
        .unwrap_or("")
        .to_string()
}

/// Decimal digits over total characters; 0.0 for the empty username.
pub fn numeric_ratio(username: &str) -> f64 {
    let len = username.chars().count();
    if len == 0 {
        return 0.0;
    }
    let digits = username.chars().filter(char::is_ascii_digit).count();
    digits as f64 / len as f64
}

/// A custom avatar is one actually served from the site's media CDN.
pub fn is_cdn_avatar(avatar_url: &str, cdn_prefix: &str) -> bool {
    !avatar_url.is_empty() && avatar_url.starts_with(cdn_prefix)
}

fn pick(items: &[String], index: usize) -> String {
    items
        .get(index)
        .filter(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| SENTINEL.into())
}

fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
