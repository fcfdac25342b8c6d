use serde::{Deserialize, Serialize};

/// Placeholder returned when an expected markup element is absent.
pub const SENTINEL: &str = "N/A";

/// Environment fallbacks for request credentials.
pub const USERNAME_ENV: &str = "INSTAGRAM_USERNAME";
pub const PASSWORD_ENV: &str = "INSTAGRAM_PASSWORD";

/// A browser session cookie. Field names follow the DevTools protocol
/// (and puppeteer cookie exports), so a seed file can be a cookie dump
/// taken from either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Seconds since the epoch. None (or a negative value, as CDP
    /// reports it) means a session cookie.
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    /// "Strict", "Lax" or "None".
    #[serde(default)]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

impl SessionCookie {
    /// A cookie is eligible for injection only when its domain matches
    /// the target site (exactly, or as a subdomain either way; a
    /// leading dot on the cookie domain is ignored). A cookie domain
    /// without a dot is a bare public suffix and never matches.
    pub fn matches_domain(&self, site: &str) -> bool {
        let own = self.domain.trim_start_matches('.');
        own == site
            || own.ends_with(&format!(".{site}"))
            || (own.contains('.') && site.ends_with(&format!(".{own}")))
    }

    /// `now` is seconds since the epoch. Session cookies never expire
    /// here; they die with the browser, not with us.
    pub fn is_expired(&self, now: f64) -> bool {
        match self.expires {
            Some(at) if at > 0.0 => at < now,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Request-supplied values win; the environment is the fallback.
    /// Returns None unless both a username and a password are known.
    pub fn resolve(username: Option<String>, password: Option<String>) -> Option<Self> {
        let username = username
            .filter(|s| !s.trim().is_empty())
            .or_else(|| std::env::var(USERNAME_ENV).ok().filter(|s| !s.is_empty()))?;
        let password = password
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var(PASSWORD_ENV).ok().filter(|s| !s.is_empty()))?;
        Some(Self { username, password })
    }
}

/// Result of one authentication attempt. Produced once per request and
/// consumed immediately.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Cached cookies were sufficient; no login form was touched.
    CachedSession,
    /// A fresh login succeeded; carries the cookies read back from the
    /// authenticated session.
    FreshLogin(Vec<SessionCookie>),
    /// Terminal failure with a human-readable reason. Never retried
    /// inside the workflow.
    Failed(String),
}

/// Everything we pull out of a profile page. Wire names match the
/// original public API of this service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub username: String,
    /// Count of decimal digits in the username divided by its length;
    /// 0.0 for an empty username.
    #[serde(rename = "nplu")]
    pub numeric_ratio: f64,
    pub has_profile_picture: bool,
    pub profile_picture: String,
    #[serde(rename = "privateAcc")]
    pub private_account: bool,
    #[serde(rename = "desc")]
    pub bio: String,
    pub likes: String,
    pub comments: String,
    pub posts: String,
    pub followers: String,
    pub following: String,
}

/// Lightweight summary of an arbitrary page, for the content render
/// action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDigest {
    pub title: String,
    pub heading: String,
    pub description: String,
    pub paragraphs: usize,
    pub links: usize,
}
