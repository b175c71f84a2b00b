use std::io;
use std::sync::Arc;

use thiserror::Error;

use simplehttp_interface::Error as TransportError;

use crate::StatusCode;

/// The errors produced while building, dispatching or reading a request.
///
/// Errors are cheap to clone so that a settled failure can be reported again by every
/// accessor of a [`crate::Response`].
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// No URL was set before the request was built.
    #[error("The \"url\" option is missing. Ensure you set the URL with the `RequestBuilder::url()` method.")]
    MissingUrl,
    /// An option was given a value or combination it cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The operation is deliberately unsupported by this implementation.
    #[error("The method \"{method}\" is not implemented")]
    NotImplemented {
        /// The unsupported operation.
        method: &'static str,
    },
    /// The response body is not a JSON object or array.
    #[error("JSON decode error: {reason}")]
    JsonDecode {
        /// Why decoding failed.
        reason: String,
    },
    /// The request body could not be serialized.
    #[error("JSON encode error")]
    JsonEncode(#[source] Arc<serde_json::Error>),
    /// The response status does not indicate success.
    #[error("Unsuccessful status code: {0}")]
    UnsuccessfulStatus(StatusCode),
    /// The transfer was canceled by the caller.
    #[error("The request was canceled")]
    Canceled,
    /// A local I/O error, e.g. while writing a response sink.
    #[error("IO Error")]
    Io(#[source] Arc<io::Error>),
    /// The transport failed. The transport error is passed through unmodified.
    #[error("Transport error: {0}")]
    Transport(#[source] Arc<TransportError>),
}

/// A `Result` alias where the `Err` case is [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The transport error behind this error, if the transport failed.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(Arc::new(e))
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonDecode {
            reason: e.to_string(),
        }
    }
}
