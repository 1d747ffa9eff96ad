use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Fetch error: {store}: {message}")]
    Fetch { store: String, message: String },

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Currency mismatch: record holds {stored}, observation is {observed}")]
    CurrencyMismatch { stored: String, observed: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl AppError {
    pub fn fetch(store: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Fetch {
            store: store.into(),
            message: message.into(),
        }
    }

    /// True for errors the tracker absorbs as a per-pair failure instead of
    /// aborting the run. Storage and startup errors stay fatal.
    pub fn is_pair_failure(&self) -> bool {
        matches!(
            self,
            AppError::Fetch { .. }
                | AppError::Http(_)
                | AppError::InvalidPrice(_)
                | AppError::CurrencyMismatch { .. }
        )
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
