/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the client, store, downloader and notifiers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Bad response: {status} - {message}")]
    BadResponse { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unrecognized image url: {0}")]
    InvalidUrl(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Notify error: {0}")]
    Notify(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether another attempt may succeed where this one failed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::BadResponse { .. })
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
