use anyhow::Result;

use gramprobe_core::config::{AppConfig, PageWaits};
use gramprobe_core::{CookieStore, Credentials};
use gramprobe_scrape::scrape_profile;

pub async fn run(
    config: AppConfig,
    profile: String,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let session = crate::commands::session_for(&config)?;
    let store = CookieStore::new(config.site.cookie_seed_paths.clone());
    let credentials = Credentials::resolve(username, password);
    let waits = PageWaits::from(&config.browser);

    let (url, record) = scrape_profile(
        &session,
        &store,
        &profile,
        credentials,
        &config.site,
        &waits,
    )
    .await?;

    let body = serde_json::json!({
        "success": true,
        "url": url,
        "data": record,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
