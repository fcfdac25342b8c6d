use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("timeout after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
