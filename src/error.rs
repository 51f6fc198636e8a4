//! Error types for bloomlink
//!
//! Provides a unified error type for all client operations.

use thiserror::Error;

/// Result type alias using BloomError
pub type Result<T> = std::result::Result<T, BloomError>;

/// Unified error type for bloomlink operations
#[derive(Debug, Error)]
pub enum BloomError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Lifecycle Errors
    // -------------------------------------------------------------------------
    /// The transport failed before the connection reached `Open`
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The connection closed while a request was outstanding
    #[error("Connection closed while a request was outstanding")]
    ConnectionClosed,

    /// A command was issued while the connection was not open
    #[error("Not connected")]
    NotConnected,

    // -------------------------------------------------------------------------
    // Service / Protocol Errors
    // -------------------------------------------------------------------------
    /// The service reported an application-level failure; carries the
    /// raw server text
    #[error("Service error: {0}")]
    Service(String),

    /// The response matched no grammar for the command that was sent;
    /// carries the raw response for diagnosis
    #[error("Protocol error: unexpected response {0:?}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Timeout Errors
    // -------------------------------------------------------------------------
    /// The opt-in response deadline expired
    #[error("Timed out waiting for a response")]
    Timeout,
}
