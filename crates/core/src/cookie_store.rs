//! Cookie cache for reusing authenticated sessions across requests.
//!
//! Valid for the life of one running process; reset on restart. The
//! only durable input is an optional read-only seed file, consulted at
//! most once per process. The store never writes anything back to
//! disk. Concurrent requests may race on an entry (last writer wins);
//! a stale read only costs the caller a fallback login.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::types::SessionCookie;

#[derive(Debug, Clone)]
struct CachedCookies {
    cookies: Vec<SessionCookie>,
    stored_at: DateTime<Utc>,
}

pub struct CookieStore {
    // domain -> cookie set
    store: DashMap<String, CachedCookies>,
    seed_paths: Vec<String>,
    seed: OnceLock<Option<Vec<SessionCookie>>>,
}

impl CookieStore {
    pub fn new(seed_paths: Vec<String>) -> Self {
        Self {
            store: DashMap::new(),
            seed_paths,
            seed: OnceLock::new(),
        }
    }

    /// Current cookie set for a domain, expired entries filtered out.
    /// The first call of the process lifetime consults the seed file
    /// candidates; the load happens at most once regardless of outcome.
    pub fn get(&self, domain: &str) -> Option<Vec<SessionCookie>> {
        let now = Utc::now().timestamp() as f64;

        if let Some(entry) = self.store.get(domain) {
            let cached = entry.value();
            debug!(
                domain,
                stored_at = %cached.stored_at,
                "reusing in-memory cookie set"
            );
            return non_empty(live_cookies(&cached.cookies, now));
        }

        let seed = self.seed.get_or_init(|| self.load_seed());
        let seeded: Vec<SessionCookie> = seed
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter(|c| c.matches_domain(domain))
            .cloned()
            .collect();
        let seeded = live_cookies(&seeded, now);
        if seeded.is_empty() {
            return None;
        }

        self.store.insert(
            domain.to_string(),
            CachedCookies {
                cookies: seeded.clone(),
                stored_at: Utc::now(),
            },
        );
        info!(domain, count = seeded.len(), "cookie cache seeded from file");
        Some(seeded)
    }

    /// Replace the cached set for a domain. Called only after a
    /// successful fresh login.
    pub fn set(&self, domain: &str, cookies: Vec<SessionCookie>) {
        debug!(domain, count = cookies.len(), "cookie cache replaced");
        self.store.insert(
            domain.to_string(),
            CachedCookies {
                cookies,
                stored_at: Utc::now(),
            },
        );
    }

    pub fn has_cookies(&self, domain: &str) -> bool {
        self.get(domain).is_some()
    }

    /// First readable, parseable candidate wins. Read and parse errors
    /// degrade to "no seed available" - they never fail the caller.
    fn load_seed(&self) -> Option<Vec<SessionCookie>> {
        for path in &self.seed_paths {
            let raw = match std::fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(e) => {
                    debug!(path, error = %e, "seed candidate not readable");
                    continue;
                }
            };
            match serde_json::from_str::<Vec<SessionCookie>>(&raw) {
                Ok(cookies) => {
                    info!(path, count = cookies.len(), "loaded seed cookies");
                    return Some(cookies);
                }
                Err(e) => {
                    warn!(path, error = %e, "seed file present but unparseable, skipping");
                }
            }
        }
        None
    }
}

fn live_cookies(cookies: &[SessionCookie], now: f64) -> Vec<SessionCookie> {
    cookies
        .iter()
        .filter(|c| !c.is_expired(now))
        .cloned()
        .collect()
}

fn non_empty(cookies: Vec<SessionCookie>) -> Option<Vec<SessionCookie>> {
    if cookies.is_empty() {
        None
    } else {
        Some(cookies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str, domain: &str, expires: Option<f64>) -> SessionCookie {
        SessionCookie {
            name: name.into(),
            value: "v".into(),
            domain: domain.into(),
            path: "/".into(),
            expires,
            http_only: false,
            secure: true,
            same_site: None,
        }
    }

    fn temp_seed(contents: &str) -> String {
        let path = std::env::temp_dir().join(format!(
            "gramprobe-seed-test-{}-{}.json",
            std::process::id(),
            contents.len()
        ));
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_empty_store_without_seed() {
        let store = CookieStore::new(vec!["/definitely/not/here.json".into()]);
        assert!(store.get("instagram.com").is_none());
        assert!(!store.has_cookies("instagram.com"));
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let store = CookieStore::new(vec![]);
        store.set("instagram.com", vec![cookie("sessionid", ".instagram.com", None)]);
        let got = store.get("instagram.com").unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "sessionid");
    }

    #[test]
    fn test_seed_file_populates_on_first_get() {
        let seed = temp_seed(
            r#"[{"name":"sessionid","value":"abc","domain":".instagram.com"},
                {"name":"other","value":"x","domain":"example.com"}]"#,
        );
        let store = CookieStore::new(vec!["/missing/first.json".into(), seed.clone()]);

        // only the domain-matching cookie is served
        let got = store.get("instagram.com").unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "sessionid");

        std::fs::remove_file(&seed).unwrap();
        // memoized: deleting the file does not affect later reads
        assert!(store.get("instagram.com").is_some());
    }

    #[test]
    fn test_unparseable_seed_degrades_to_none() {
        let seed = temp_seed("not json at all");
        let store = CookieStore::new(vec![seed.clone()]);
        assert!(store.get("instagram.com").is_none());
        std::fs::remove_file(&seed).unwrap();
    }

    #[test]
    fn test_expired_cookies_are_dropped() {
        let store = CookieStore::new(vec![]);
        store.set(
            "instagram.com",
            vec![
                cookie("dead", ".instagram.com", Some(1_000.0)),
                cookie("alive", ".instagram.com", None),
            ],
        );
        let got = store.get("instagram.com").unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "alive");

        store.set("instagram.com", vec![cookie("dead", ".instagram.com", Some(1_000.0))]);
        assert!(store.get("instagram.com").is_none());
    }

    #[test]
    fn test_set_replaces_not_merges() {
        let store = CookieStore::new(vec![]);
        store.set("instagram.com", vec![cookie("a", ".instagram.com", None)]);
        store.set("instagram.com", vec![cookie("b", ".instagram.com", None)]);
        let got = store.get("instagram.com").unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "b");
    }
}
