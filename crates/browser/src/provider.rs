use std::ffi::OsString;
use std::time::Duration;

use headless_chrome::Browser;
use tracing::info;

use gramprobe_core::config::BrowserConfig;
use gramprobe_core::ScrapeError;

use crate::session::ChromeSession;

/// Supplies one fresh browser session per request. Selected once at
/// process start; workflow code never sees which variant is behind it.
pub trait SessionProvider: Send + Sync {
    fn acquire(&self) -> Result<ChromeSession, ScrapeError>;
}

/// Build the provider named by `config.provider`.
pub fn provider_from_config(config: &BrowserConfig) -> Result<Box<dyn SessionProvider>, ScrapeError> {
    match config.provider.as_str() {
        "local" => Ok(Box::new(LocalLauncher::new(config.clone()))),
        "remote" => {
            let ws_url = config
                .remote_ws_url
                .clone()
                .or_else(|| std::env::var("CHROME_REMOTE_URL").ok())
                .ok_or_else(|| {
                    ScrapeError::Config(
                        "browser.provider = \"remote\" requires remote_ws_url or CHROME_REMOTE_URL"
                            .to_string(),
                    )
                })?;
            Ok(Box::new(RemoteAttach::new(ws_url, config.clone())))
        }
        other => Err(ScrapeError::Config(format!(
            "unknown browser provider '{other}' (expected \"local\" or \"remote\")"
        ))),
    }
}

/// Launches a headless Chrome process per session.
pub struct LocalLauncher {
    config: BrowserConfig,
}

impl LocalLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl SessionProvider for LocalLauncher {
    fn acquire(&self) -> Result<ChromeSession, ScrapeError> {
        let mut extra_args: Vec<OsString> = Vec::new();

        // Required for running in containers
        extra_args.push(OsString::from("--no-sandbox"));
        extra_args.push(OsString::from("--disable-dev-shm-usage"));
        extra_args.push(OsString::from("--disable-gpu"));
        extra_args.push(OsString::from("--hide-scrollbars"));
        extra_args.push(OsString::from("--mute-audio"));

        let mut builder = headless_chrome::LaunchOptionsBuilder::default();
        builder
            .headless(true)
            .window_size(Some((self.config.window_width, self.config.window_height)))
            .idle_browser_timeout(Duration::from_secs(300))
            .args(extra_args.iter().map(|a| a.as_ref()).collect());

        // CHROME_PATH wins over the config file (Docker/custom installs)
        let chrome_path = std::env::var("CHROME_PATH")
            .ok()
            .or_else(|| self.config.chrome_path.clone());
        if let Some(path) = chrome_path {
            builder.path(Some(std::path::PathBuf::from(path)));
        }

        let launch_options = builder
            .build()
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| ScrapeError::Browser(e.to_string()))?;
        info!("launched local chrome");

        ChromeSession::open(browser, &self.config)
    }
}

/// Attaches to an already-running, externally managed Chrome over its
/// DevTools websocket.
pub struct RemoteAttach {
    ws_url: String,
    config: BrowserConfig,
}

impl RemoteAttach {
    pub fn new(ws_url: String, config: BrowserConfig) -> Self {
        Self { ws_url, config }
    }
}

impl SessionProvider for RemoteAttach {
    fn acquire(&self) -> Result<ChromeSession, ScrapeError> {
        let browser = Browser::connect(self.ws_url.clone())
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        info!(ws_url = %self.ws_url, "attached to remote chrome");

        ChromeSession::open(browser, &self.config)
    }
}
