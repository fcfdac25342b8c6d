pub mod config;
pub mod cookie_store;
pub mod error;
pub mod session;
pub mod types;

pub use config::AppConfig;
pub use cookie_store::CookieStore;
pub use error::ScrapeError;
pub use session::PageSession;
pub use types::*;
