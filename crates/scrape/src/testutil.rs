//! Scripted in-memory `PageSession` for workflow tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use gramprobe_core::{PageSession, ScrapeError, SessionCookie};

pub fn cookie(name: &str, domain: &str) -> SessionCookie {
    SessionCookie {
        name: name.into(),
        value: "v".into(),
        domain: domain.into(),
        path: "/".into(),
        expires: None,
        http_only: true,
        secure: true,
        same_site: Some("Lax".into()),
    }
}

/// Each navigation (plain or submit-triggered) "lands" on the next
/// scripted URL; when the script runs out, the requested URL is used
/// as-is.
#[derive(Default)]
pub struct MockSession {
    landings: Mutex<Vec<String>>,
    current: Mutex<String>,
    pub html: String,
    /// Selectors that are absent from the page; everything else exists.
    pub absent: Vec<String>,
    pub cookies_after_login: Vec<SessionCookie>,
    pub fail_navigation: bool,

    pub navigations: Mutex<usize>,
    pub fills: Mutex<Vec<(String, String)>>,
    pub submits: Mutex<Vec<String>>,
    pub injected: Mutex<Vec<SessionCookie>>,
}

impl MockSession {
    pub fn landing_at(urls: &[&str]) -> Self {
        // stored reversed so pop() yields them in order
        let landings = urls.iter().rev().map(|u| u.to_string()).collect();
        Self {
            landings: Mutex::new(landings),
            ..Self::default()
        }
    }

    fn land(&self, requested: &str) {
        let next = self
            .landings
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| requested.to_string());
        *self.current.lock().unwrap() = next;
    }
}

#[async_trait]
impl PageSession for MockSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        if self.fail_navigation {
            return Err(ScrapeError::Timeout {
                what: "page to go quiet".to_string(),
                secs: timeout.as_secs(),
            });
        }
        *self.navigations.lock().unwrap() += 1;
        self.land(url);
        Ok(())
    }

    fn current_url(&self) -> Result<String, ScrapeError> {
        Ok(self.current.lock().unwrap().clone())
    }

    fn fill_field(&self, selector: &str, value: &str) -> Result<(), ScrapeError> {
        self.fills
            .lock()
            .unwrap()
            .push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn submit_and_wait(&self, selector: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        self.submits.lock().unwrap().push(selector.to_string());
        let current = self.current.lock().unwrap().clone();
        self.land(&current);
        Ok(())
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        Ok(!self.absent.iter().any(|s| s == selector))
    }

    fn hover(&self, _selector: &str) -> Result<(), ScrapeError> {
        Ok(())
    }

    fn content(&self) -> Result<String, ScrapeError> {
        Ok(self.html.clone())
    }

    fn inject_cookies(&self, cookies: &[SessionCookie]) -> Result<(), ScrapeError> {
        self.injected.lock().unwrap().extend_from_slice(cookies);
        Ok(())
    }

    fn session_cookies(&self) -> Result<Vec<SessionCookie>, ScrapeError> {
        Ok(self.cookies_after_login.clone())
    }

    fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>, ScrapeError> {
        Ok(b"png".to_vec())
    }

    fn pdf(&self) -> Result<Vec<u8>, ScrapeError> {
        Ok(b"pdf".to_vec())
    }
}
