use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrowserConfig {
    /// "local" launches a Chrome process, "remote" attaches to a
    /// managed instance over its DevTools websocket. Chosen once at
    /// startup; workflow code never branches on it.
    pub provider: String,
    pub remote_ws_url: Option<String>,
    pub chrome_path: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,
    pub nav_timeout_seconds: u64,
    pub body_timeout_seconds: u64,
    pub marker_timeout_seconds: u64,
    /// Trailing quiet window for the idle-navigation condition.
    pub quiescence_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            remote_ws_url: None,
            chrome_path: None,
            window_width: 1280,
            window_height: 800,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            nav_timeout_seconds: 30,
            body_timeout_seconds: 10,
            marker_timeout_seconds: 3,
            quiescence_ms: 1500,
        }
    }
}

impl BrowserConfig {
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

/// Per-step wait budget for the scrape workflows.
#[derive(Debug, Clone, Copy)]
pub struct PageWaits {
    pub nav: Duration,
    pub body: Duration,
    pub marker: Duration,
}

impl From<&BrowserConfig> for PageWaits {
    fn from(cfg: &BrowserConfig) -> Self {
        Self {
            nav: Duration::from_secs(cfg.nav_timeout_seconds),
            body: Duration::from_secs(cfg.body_timeout_seconds),
            marker: Duration::from_secs(cfg.marker_timeout_seconds),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SiteConfig {
    /// Where an authentication attempt lands first.
    pub landing_url: String,
    /// URL-path fragment identifying the login page.
    pub login_path: String,
    /// Registrable domain of the target site; also the marker used to
    /// pull the username out of a profile URL.
    pub domain: String,
    /// Host prefix of the site's media CDN; avatars served from
    /// anywhere else count as the default placeholder.
    pub cdn_prefix: String,
    /// Candidate seed-cookie files, checked in order, first match wins.
    pub cookie_seed_paths: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            landing_url: "https://www.instagram.com/accounts/login/".to_string(),
            login_path: "/accounts/login".to_string(),
            domain: "instagram.com".to_string(),
            cdn_prefix: "https://scontent".to_string(),
            cookie_seed_paths: vec![
                "cookies.json".to_string(),
                "/tmp/gramprobe-cookies.json".to_string(),
            ],
        }
    }
}

impl SiteConfig {
    /// Canonical profile URL for a bare handle.
    pub fn profile_url(&self, handle: &str) -> String {
        format!("https://www.{}/{}/", self.domain, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.browser.provider, "local");
        assert_eq!(config.browser.nav_timeout_seconds, 30);
        assert_eq!(config.site.domain, "instagram.com");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [browser]
            provider = "remote"
            remote_ws_url = "ws://chrome:9222/devtools/browser/x"
            "#,
        )
        .unwrap();
        assert_eq!(config.browser.provider, "remote");
        assert_eq!(config.browser.window_width, 1280);
        assert_eq!(config.site.login_path, "/accounts/login");
    }

    #[test]
    fn test_profile_url_for_handle() {
        let site = SiteConfig::default();
        assert_eq!(site.profile_url("nasa"), "https://www.instagram.com/nasa/");
    }
}
