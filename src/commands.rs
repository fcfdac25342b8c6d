pub mod render;
pub mod scrape;

use gramprobe_browser::{provider_from_config, ChromeSession};
use gramprobe_core::config::AppConfig;
use gramprobe_core::ScrapeError;

/// One-shot session for a CLI invocation. Dropping it tears the
/// browser down.
pub(crate) fn session_for(config: &AppConfig) -> Result<ChromeSession, ScrapeError> {
    provider_from_config(&config.browser)?.acquire()
}
