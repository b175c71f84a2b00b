//! Error types for transports.

use std::error::Error as StdError;

use thiserror::Error;

/// The failure kinds a transport may report.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided URL is invalid or not absolute.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// An underlying I/O error occurred.
    #[error("IO Error")]
    Io(#[from] std::io::Error),
    /// The connection could not be established or broke down.
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn StdError + Send + Sync>),
    /// TLS configuration or handshake failed.
    #[error("TLS error: {0}")]
    Tls(String),
    /// The request timed out before completion.
    #[error("Request is not finished within timeout")]
    RequestTimeout,
    /// The transport deliberately does not support a requested setting.
    #[error("Transport does not support the \"{0}\" option")]
    Unsupported(&'static str),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
