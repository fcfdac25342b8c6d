use std::time::Duration;

use anyhow::Result;

use gramprobe_core::config::AppConfig;
use gramprobe_scrape::render;

fn nav_timeout(config: &AppConfig) -> Duration {
    Duration::from_secs(config.browser.nav_timeout_seconds)
}

pub async fn screenshot(
    config: AppConfig,
    url: String,
    output: String,
    full_page: bool,
) -> Result<()> {
    let session = crate::commands::session_for(&config)?;
    let png = render::screenshot(&session, &url, full_page, nav_timeout(&config)).await?;
    std::fs::write(&output, &png)?;
    println!("wrote {} bytes to {}", png.len(), output);
    Ok(())
}

pub async fn pdf(config: AppConfig, url: String, output: String) -> Result<()> {
    let session = crate::commands::session_for(&config)?;
    let bytes = render::pdf(&session, &url, nav_timeout(&config)).await?;
    std::fs::write(&output, &bytes)?;
    println!("wrote {} bytes to {}", bytes.len(), output);
    Ok(())
}

pub async fn content(config: AppConfig, url: String) -> Result<()> {
    let session = crate::commands::session_for(&config)?;
    let digest = render::digest(&session, &url, nav_timeout(&config)).await?;
    println!("{}", serde_json::to_string_pretty(&digest)?);
    Ok(())
}
