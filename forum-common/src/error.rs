//! Common error types for the forum services

use thiserror::Error;

/// Common result type for forum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the forum crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requester lacks the permission needed for the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Thread type outside {discussion, question} reached the notification
    /// dispatcher. Treated as a configuration error and never swallowed.
    #[error("Invalid thread type {0}")]
    UnknownThreadType(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
