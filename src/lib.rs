pub mod config;
pub mod evaluator;
pub mod history;
pub mod models;
pub mod notify;
pub mod sources;
pub mod tracker;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
