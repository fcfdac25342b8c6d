//! Profile extraction workflow: navigate, classify visibility, take
//! one snapshot, derive the record.

use tracing::{debug, info};
use url::Url;

use gramprobe_core::config::{PageWaits, SiteConfig};
use gramprobe_core::{
    AuthOutcome, CookieStore, Credentials, PageSession, ProfileRecord, ScrapeError,
};

use crate::auth::authenticate;
use crate::extract::{self, AVATAR_MARKER};
use crate::render::normalize_url;

/// Turn a profile identifier (URL or bare handle) into a canonical
/// profile URL on the target site.
pub fn normalize_profile_url(raw: &str, site: &SiteConfig) -> Result<String, ScrapeError> {
    let trimmed = raw.trim().trim_start_matches('@');
    if trimmed.is_empty() {
        return Err(ScrapeError::InvalidInput("profile is required".to_string()));
    }
    // a bare handle has no path or host structure of its own
    if !trimmed.contains('/') && !trimmed.contains('.') {
        return Ok(site.profile_url(trimmed));
    }

    // the host itself must be the site or one of its subdomains; the
    // domain appearing elsewhere in the URL text proves nothing
    let normalized = normalize_url(trimmed)?;
    let parsed = Url::parse(&normalized)
        .map_err(|e| ScrapeError::InvalidInput(format!("invalid url: {e}")))?;
    let host = parsed.host_str().unwrap_or_default();
    if host == site.domain || host.ends_with(&format!(".{}", site.domain)) {
        return Ok(normalized);
    }
    Err(ScrapeError::InvalidInput(format!(
        "'{raw}' is neither a {} profile url nor a handle",
        site.domain
    )))
}

/// Full request flow: authenticate, then extract. Returns the
/// normalized profile URL alongside the record so callers can echo it.
pub async fn scrape_profile(
    session: &dyn PageSession,
    store: &CookieStore,
    profile: &str,
    credentials: Option<Credentials>,
    site: &SiteConfig,
    waits: &PageWaits,
) -> Result<(String, ProfileRecord), ScrapeError> {
    let profile_url = normalize_profile_url(profile, site)?;

    match authenticate(session, store, credentials, site, waits.nav).await {
        AuthOutcome::CachedSession => debug!("session reused from cookie cache"),
        AuthOutcome::FreshLogin(cookies) => debug!(cookies = cookies.len(), "fresh login"),
        AuthOutcome::Failed(reason) => return Err(ScrapeError::AuthFailed(reason)),
    }

    let record = extract_profile(session, &profile_url, site, waits).await?;
    Ok((profile_url, record))
}

/// Extract a [`ProfileRecord`] from an authenticated session.
pub async fn extract_profile(
    session: &dyn PageSession,
    profile_url: &str,
    site: &SiteConfig,
    waits: &PageWaits,
) -> Result<ProfileRecord, ScrapeError> {
    session
        .navigate(profile_url, waits.nav)
        .await
        .map_err(|e| ScrapeError::Extraction(format!("profile navigation: {e}")))?;

    if !session.wait_for_element("body", waits.body).await? {
        return Err(ScrapeError::Extraction(
            "document body never appeared".to_string(),
        ));
    }

    // the avatar marker doubles as the public/private signal; a
    // private account is a valid terminal state, not an error
    let private_account = !session.wait_for_element(AVATAR_MARKER, waits.marker).await?;
    if private_account {
        info!(profile_url, "avatar marker absent, treating account as private");
    } else if let Err(e) = session.hover(AVATAR_MARKER) {
        // best effort: lazy content behind the hover is a bonus
        debug!(error = %e, "avatar hover failed");
    }

    // single snapshot; every field below comes from this one view
    let html = session
        .content()
        .map_err(|e| ScrapeError::Extraction(format!("content snapshot: {e}")))?;
    let fields = extract::page_fields(&html);

    let username = extract::username_from_url(profile_url, &site.domain);
    let numeric_ratio = extract::numeric_ratio(&username);
    let has_profile_picture = extract::is_cdn_avatar(&fields.profile_picture, &site.cdn_prefix);

    Ok(ProfileRecord {
        username,
        numeric_ratio,
        has_profile_picture,
        profile_picture: fields.profile_picture,
        private_account,
        bio: fields.bio,
        likes: fields.likes,
        comments: fields.comments,
        posts: fields.posts,
        followers: fields.followers,
        following: fields.following,
    })
}
