//! Error types for the wireplan core.

/// Core error type for wireplan host-level infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum WirePlanError {
    /// An unrecognized wire format name.
    #[error("unknown wire format: {0} (expected `json` or `xml`)")]
    UnknownFormat(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for wireplan operations.
pub type WirePlanResult<T> = Result<T, WirePlanError>;
