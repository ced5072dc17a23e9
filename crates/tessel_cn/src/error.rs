//! Error types for tessel_cn

use thiserror::Error;

/// Boxed error produced by a caller-supplied options loader
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in Tessel components
#[derive(Error, Debug)]
pub enum SelectError {
    /// A caller option tree could not be decoded
    #[error("invalid option tree: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// Async options were requested but no loader was configured
    #[error("async options requested without a loader")]
    LoaderMissing,

    /// The caller's loader failed
    #[error("options loader failed: {0}")]
    Load(#[source] LoadError),
}

/// Result type for tessel_cn operations
pub type Result<T> = std::result::Result<T, SelectError>;
