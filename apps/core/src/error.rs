use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
///
/// The understanding pipeline itself never fails on well-formed text; these
/// variants cover the durability and configuration edges around it.
#[derive(Debug, Error)]
pub enum AppError {
    /// Represents standard input/output errors (e.g., weight file writes).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents serialization errors from the weight-table persistence format.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Represents configuration-related errors (e.g., unparseable environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}
