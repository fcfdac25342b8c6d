use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Network::CookieParam;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, Tab};
use tracing::{debug, trace};

use gramprobe_core::{PageSession, ScrapeError, SessionCookie};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One page in one browser. Dropping the session is the single
/// teardown point: the tab is closed best-effort and, for locally
/// launched browsers, the Chrome process dies with the `Browser`
/// handle. Both are no-ops when already gone.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
    quiescence: Duration,
}

impl ChromeSession {
    pub(crate) fn open(
        browser: Browser,
        config: &gramprobe_core::config::BrowserConfig,
    ) -> Result<Self, ScrapeError> {
        let tab = browser.new_tab().map_err(browser_err)?;
        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(browser_err)?;
        Ok(Self {
            _browser: browser,
            tab,
            quiescence: config.quiescence(),
        })
    }

    /// Wait until the rendered markup stops changing for the trailing
    /// quiescence window. Cheap stand-in for a network-idle event:
    /// late responses keep mutating the DOM, so a stable snapshot
    /// means the page has gone quiet.
    async fn wait_for_quiet(&self, started: Instant, timeout: Duration) -> Result<(), ScrapeError> {
        let mut last_len = 0usize;
        let mut quiet_since = Instant::now();

        loop {
            if started.elapsed() > timeout {
                return Err(ScrapeError::Timeout {
                    what: "page to go quiet".to_string(),
                    secs: timeout.as_secs(),
                });
            }

            let len = self.tab.get_content().map(|c| c.len()).unwrap_or(0);
            if len == 0 || len != last_len {
                last_len = len;
                quiet_since = Instant::now();
            } else if quiet_since.elapsed() >= self.quiescence {
                trace!(bytes = len, "page quiet");
                return Ok(());
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        let _ = self.tab.close(false);
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let started = Instant::now();
        debug!(url, "navigating");
        self.tab.set_default_timeout(timeout);
        self.tab.navigate_to(url).map_err(browser_err)?;
        self.tab.wait_until_navigated().map_err(browser_err)?;
        self.wait_for_quiet(started, timeout).await
    }

    fn current_url(&self) -> Result<String, ScrapeError> {
        Ok(self.tab.get_url())
    }

    fn fill_field(&self, selector: &str, value: &str) -> Result<(), ScrapeError> {
        self.tab
            .evaluate(
                &format!(
                    r#"
                    const elem = document.querySelector('{}');
                    if (elem) {{
                        elem.value = '{}';
                        elem.dispatchEvent(new Event('input', {{ bubbles: true }}));
                        elem.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    }} else {{
                        throw new Error('Element not found: {}');
                    }}
                    "#,
                    js_escape(selector),
                    js_escape(value),
                    js_escape(selector)
                ),
                false,
            )
            .map_err(browser_err)?;
        Ok(())
    }

    async fn submit_and_wait(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let started = Instant::now();
        self.tab.set_default_timeout(timeout);
        self.tab
            .evaluate(
                &format!(
                    r#"
                    const elem = document.querySelector('{}');
                    if (elem) {{
                        elem.click();
                    }} else {{
                        throw new Error('Element not found: {}');
                    }}
                    "#,
                    js_escape(selector),
                    js_escape(selector)
                ),
                false,
            )
            .map_err(browser_err)?;
        // the click is what starts the navigation; pick it up here
        // rather than returning control in between
        self.tab.wait_until_navigated().map_err(browser_err)?;
        self.wait_for_quiet(started, timeout).await
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        Ok(self
            .tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .is_ok())
    }

    fn hover(&self, selector: &str) -> Result<(), ScrapeError> {
        self.tab
            .find_element(selector)
            .and_then(|el| el.move_mouse_over().map(|_| ()))
            .map_err(browser_err)
    }

    fn content(&self) -> Result<String, ScrapeError> {
        self.tab.get_content().map_err(browser_err)
    }

    fn inject_cookies(&self, cookies: &[SessionCookie]) -> Result<(), ScrapeError> {
        let params = cookies
            .iter()
            .map(to_cookie_param)
            .collect::<Result<Vec<CookieParam>, ScrapeError>>()?;
        debug!(count = params.len(), "injecting cookies");
        self.tab.set_cookies(params).map_err(browser_err)
    }

    fn session_cookies(&self) -> Result<Vec<SessionCookie>, ScrapeError> {
        let cookies = self.tab.get_cookies().map_err(browser_err)?;
        let raw = serde_json::to_value(&cookies)
            .map_err(|e| ScrapeError::Browser(format!("cookie serialization: {e}")))?;
        Ok(from_cdp_cookies(&raw))
    }

    fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, ScrapeError> {
        let clip = if full_page {
            self.tab
                .find_element("body")
                .ok()
                .and_then(|el| el.get_box_model().ok())
                .map(|model| model.content_viewport())
        } else {
            None
        };
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, clip, true)
            .map_err(browser_err)
    }

    fn pdf(&self) -> Result<Vec<u8>, ScrapeError> {
        let options = PrintToPdfOptions {
            print_background: Some(true),
            ..PrintToPdfOptions::default()
        };
        self.tab.print_to_pdf(Some(options)).map_err(browser_err)
    }
}

fn browser_err<E: std::fmt::Display>(e: E) -> ScrapeError {
    ScrapeError::Browser(e.to_string())
}

fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Go through the protocol's own serde shape instead of naming every
/// CookieParam field; missing optionals default on the way in.
fn to_cookie_param(c: &SessionCookie) -> Result<CookieParam, ScrapeError> {
    serde_json::from_value(serde_json::json!({
        "name": c.name,
        "value": c.value,
        "domain": c.domain,
        "path": c.path,
        "secure": c.secure,
        "httpOnly": c.http_only,
        "sameSite": c.same_site,
        "expires": c.expires.filter(|e| *e > 0.0),
    }))
    .map_err(|e| ScrapeError::Browser(format!("cookie conversion: {e}")))
}

fn from_cdp_cookies(raw: &serde_json::Value) -> Vec<SessionCookie> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|c| {
            let session = c["session"].as_bool().unwrap_or(false);
            Some(SessionCookie {
                name: c["name"].as_str()?.to_string(),
                value: c["value"].as_str().unwrap_or_default().to_string(),
                domain: c["domain"].as_str().unwrap_or_default().to_string(),
                path: c["path"].as_str().unwrap_or("/").to_string(),
                expires: c["expires"].as_f64().filter(|e| !session && *e > 0.0),
                http_only: c["httpOnly"].as_bool().unwrap_or(false),
                secure: c["secure"].as_bool().unwrap_or(false),
                same_site: c["sameSite"].as_str().map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_escape_quotes_and_backslashes() {
        assert_eq!(js_escape("plain"), "plain");
        assert_eq!(js_escape("o'brien"), "o\\'brien");
        assert_eq!(js_escape(r"a\b"), r"a\\b");
        assert_eq!(js_escape("two\nlines"), "two\\nlines");
    }

    #[test]
    fn test_cookie_param_conversion() {
        let cookie = SessionCookie {
            name: "sessionid".into(),
            value: "abc".into(),
            domain: ".instagram.com".into(),
            path: "/".into(),
            expires: Some(1_999_999_999.0),
            http_only: true,
            secure: true,
            same_site: Some("Lax".into()),
        };
        let param = to_cookie_param(&cookie).unwrap();
        assert_eq!(param.name, "sessionid");
        assert_eq!(param.domain.as_deref(), Some(".instagram.com"));
        assert_eq!(param.http_only, Some(true));
        assert_eq!(param.expires, Some(1_999_999_999.0));

        // session cookie: negative CDP expiry must not be forwarded
        let session_cookie = SessionCookie {
            expires: Some(-1.0),
            ..cookie
        };
        let param = to_cookie_param(&session_cookie).unwrap();
        assert_eq!(param.expires, None);
    }

    #[test]
    fn test_cdp_cookie_readback_mapping() {
        let raw = serde_json::json!([
            {
                "name": "sessionid",
                "value": "abc",
                "domain": ".instagram.com",
                "path": "/",
                "expires": 1999999999.0,
                "size": 10,
                "httpOnly": true,
                "secure": true,
                "session": false,
                "sameSite": "Lax",
                "priority": "Medium"
            },
            {
                "name": "mid",
                "value": "x",
                "domain": ".instagram.com",
                "path": "/",
                "expires": -1.0,
                "size": 4,
                "httpOnly": false,
                "secure": true,
                "session": true,
                "priority": "Medium"
            }
        ]);
        let cookies = from_cdp_cookies(&raw);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].expires, Some(1_999_999_999.0));
        assert_eq!(cookies[0].same_site.as_deref(), Some("Lax"));
        assert_eq!(cookies[1].expires, None);
        assert_eq!(cookies[1].same_site, None);
    }
}
