use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::types::SessionCookie;

/// Capability seam over one browser page. The workflows in the scrape
/// crate depend on this trait only; the concrete Chrome-backed
/// implementation lives in the browser crate, and tests script it.
///
/// Implementations own their teardown: dropping a session must release
/// the underlying page/browser on every exit path, and doing so twice
/// (or for a never-opened page) is a no-op.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and wait for the page to go quiet (no fresh content
    /// within a trailing quiescence window), bounded by `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// URL the page ended up on after the last navigation.
    fn current_url(&self) -> Result<String, ScrapeError>;

    fn fill_field(&self, selector: &str, value: &str) -> Result<(), ScrapeError>;

    /// Click `selector` and await the navigation it triggers as one
    /// joint operation, with the same quiet-page condition as
    /// `navigate`. Splitting the click from the wait can miss the
    /// navigation start.
    async fn submit_and_wait(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Wait up to `timeout` for an element; absence is an answer, not
    /// an error.
    async fn wait_for_element(&self, selector: &str, timeout: Duration)
        -> Result<bool, ScrapeError>;

    fn hover(&self, selector: &str) -> Result<(), ScrapeError>;

    /// Full rendered markup of the page as it stands now.
    fn content(&self) -> Result<String, ScrapeError>;

    /// Inject cookies before navigation. Callers pass only cookies
    /// eligible for the target site.
    fn inject_cookies(&self, cookies: &[SessionCookie]) -> Result<(), ScrapeError>;

    /// Read back every cookie the session currently holds.
    fn session_cookies(&self) -> Result<Vec<SessionCookie>, ScrapeError>;

    fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, ScrapeError>;

    fn pdf(&self) -> Result<Vec<u8>, ScrapeError>;
}
