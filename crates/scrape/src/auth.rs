//! Authentication workflow: cached-cookie reuse first, fresh login as
//! the fallback.
//!
//! State machine: Start -> TryCachedSession -> {Authenticated |
//! NeedsLogin} -> {LoginSucceeded -> Authenticated | LoginFailed ->
//! Failed}. Nothing in here retries; a failed step is classified and
//! returned, and any retry policy belongs to the caller.

use std::time::Duration;

use tracing::{debug, info, warn};

use gramprobe_core::config::SiteConfig;
use gramprobe_core::{AuthOutcome, CookieStore, Credentials, PageSession};

const USERNAME_INPUT: &str = r#"input[name="username"]"#;
const PASSWORD_INPUT: &str = r#"input[name="password"]"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;

/// Drive the session to an authenticated state. The store is the only
/// cross-request state: read before navigation, overwritten only after
/// a successful fresh login.
pub async fn authenticate(
    session: &dyn PageSession,
    store: &CookieStore,
    credentials: Option<Credentials>,
    site: &SiteConfig,
    nav_timeout: Duration,
) -> AuthOutcome {
    if let Some(cached) = store.get(&site.domain) {
        let eligible: Vec<_> = cached
            .into_iter()
            .filter(|c| c.matches_domain(&site.domain))
            .collect();
        if !eligible.is_empty() {
            match session.inject_cookies(&eligible) {
                Ok(()) => debug!(count = eligible.len(), "injected cached cookies"),
                // not fatal: the login fallback below still applies
                Err(e) => warn!(error = %e, "cookie injection failed"),
            }
        }
    }

    if let Err(e) = session.navigate(&site.landing_url, nav_timeout).await {
        return AuthOutcome::Failed(format!("landing navigation: {e}"));
    }

    let landed = match session.current_url() {
        Ok(url) => url,
        Err(e) => return AuthOutcome::Failed(format!("landing url: {e}")),
    };
    if !landed.contains(&site.login_path) {
        info!("authenticated via cached session");
        return AuthOutcome::CachedSession;
    }

    // cached cookies absent or stale; a login is the only way forward
    let creds = match credentials {
        Some(creds) => creds,
        None => return AuthOutcome::Failed("credentials not configured".to_string()),
    };
    debug!(user = %creds.username, "logging in");

    if let Err(e) = session.fill_field(USERNAME_INPUT, &creds.username) {
        return AuthOutcome::Failed(format!("login form: {e}"));
    }
    if let Err(e) = session.fill_field(PASSWORD_INPUT, &creds.password) {
        return AuthOutcome::Failed(format!("login form: {e}"));
    }
    if let Err(e) = session.submit_and_wait(SUBMIT_BUTTON, nav_timeout).await {
        return AuthOutcome::Failed(format!("login submit: {e}"));
    }

    match session.current_url() {
        Ok(url) if url.contains(&site.login_path) => {
            return AuthOutcome::Failed("invalid credentials".to_string());
        }
        Err(e) => return AuthOutcome::Failed(format!("post-login url: {e}")),
        Ok(_) => {}
    }

    match session.session_cookies() {
        Ok(cookies) => {
            store.set(&site.domain, cookies.clone());
            info!(count = cookies.len(), "fresh login succeeded, cookie cache updated");
            AuthOutcome::FreshLogin(cookies)
        }
        Err(e) => AuthOutcome::Failed(format!("cookie readback: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{cookie, MockSession};

    const LOGIN_URL: &str = "https://www.instagram.com/accounts/login/";
    const HOME_URL: &str = "https://www.instagram.com/";

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    fn creds() -> Option<Credentials> {
        Some(Credentials {
            username: "someone".into(),
            password: "hunter2".into(),
        })
    }

    fn nav() -> Duration {
        Duration::from_secs(30)
    }

    #[tokio::test]
    async fn test_cached_cookies_skip_login() {
        let store = CookieStore::new(vec![]);
        store.set("instagram.com", vec![cookie("sessionid", ".instagram.com")]);

        let session = MockSession::landing_at(&[HOME_URL]);
        let outcome = authenticate(&session, &store, creds(), &site(), nav()).await;

        assert!(matches!(outcome, AuthOutcome::CachedSession));
        assert_eq!(session.injected.lock().unwrap().len(), 1);
        // no login form interaction at all
        assert!(session.fills.lock().unwrap().is_empty());
        assert!(session.submits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_login_replaces_store() {
        let store = CookieStore::new(vec![]);
        let mut session = MockSession::landing_at(&[LOGIN_URL, HOME_URL]);
        session.cookies_after_login = vec![cookie("sessionid", ".instagram.com")];

        let outcome = authenticate(&session, &store, creds(), &site(), nav()).await;

        match outcome {
            AuthOutcome::FreshLogin(cookies) => assert_eq!(cookies.len(), 1),
            other => panic!("expected FreshLogin, got {other:?}"),
        }
        let fills = session.fills.lock().unwrap();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].1, "someone");
        assert_eq!(fills[1].1, "hunter2");
        assert_eq!(session.submits.lock().unwrap().len(), 1);

        let cached = store.get("instagram.com").expect("store updated");
        assert_eq!(cached[0].name, "sessionid");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_terminal() {
        let store = CookieStore::new(vec![]);
        let session = MockSession::landing_at(&[LOGIN_URL]);

        let outcome = authenticate(&session, &store, None, &site(), nav()).await;

        match outcome {
            AuthOutcome::Failed(reason) => assert_eq!(reason, "credentials not configured"),
            other => panic!("expected Failed, got {other:?}"),
        }
        // zero login attempts
        assert!(session.fills.lock().unwrap().is_empty());
        assert!(session.submits.lock().unwrap().is_empty());
        assert!(store.get("instagram.com").is_none());
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let store = CookieStore::new(vec![]);
        let session = MockSession::landing_at(&[LOGIN_URL, LOGIN_URL]);

        let outcome = authenticate(&session, &store, creds(), &site(), nav()).await;

        match outcome {
            AuthOutcome::Failed(reason) => assert_eq!(reason, "invalid credentials"),
            other => panic!("expected Failed, got {other:?}"),
        }
        // the rejected attempt must not poison the cache
        assert!(store.get("instagram.com").is_none());
    }

    #[tokio::test]
    async fn test_navigation_failure_classified() {
        let store = CookieStore::new(vec![]);
        let mut session = MockSession::landing_at(&[HOME_URL]);
        session.fail_navigation = true;

        let outcome = authenticate(&session, &store, creds(), &site(), nav()).await;

        match outcome {
            AuthOutcome::Failed(reason) => assert!(reason.contains("landing navigation")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ineligible_cached_cookies_not_injected() {
        let store = CookieStore::new(vec![]);
        store.set("instagram.com", vec![cookie("stray", "example.com")]);

        let session = MockSession::landing_at(&[HOME_URL]);
        let _ = authenticate(&session, &store, creds(), &site(), nav()).await;

        assert!(session.injected.lock().unwrap().is_empty());
    }
}
