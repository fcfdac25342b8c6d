pub mod provider;
pub mod session;

pub use provider::{provider_from_config, LocalLauncher, RemoteAttach, SessionProvider};
pub use session::ChromeSession;
