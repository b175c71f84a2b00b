use std::io;

use simplehttp_interface::Error as TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReqwestTransportError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("tokio error: {0}")]
    Tokio(#[from] tokio::task::JoinError),
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
    #[error("invalid header value for {0}")]
    InvalidHeaderValue(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("TLS configuration error: {0}")]
    Tls(String),
    #[error("request timed out")]
    Timeout,
    #[error("{0} is not supported by the reqwest transport")]
    Unsupported(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ReqwestTransportError> for TransportError {
    fn from(err: ReqwestTransportError) -> Self {
        match err {
            ReqwestTransportError::Reqwest(e) if e.is_timeout() => TransportError::RequestTimeout,
            ReqwestTransportError::Reqwest(e) if e.is_builder() => {
                TransportError::InvalidUrl(e.to_string())
            }
            ReqwestTransportError::Reqwest(e) => TransportError::Network(Box::new(e)),
            ReqwestTransportError::InvalidUrl(msg) => TransportError::InvalidUrl(msg),
            ReqwestTransportError::Tls(msg) => TransportError::Tls(msg),
            ReqwestTransportError::Timeout => TransportError::RequestTimeout,
            ReqwestTransportError::Unsupported(what) => TransportError::Unsupported(what),
            ReqwestTransportError::Io(e) => TransportError::Io(e),
            other => TransportError::Network(Box::new(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReqwestTransportError>;
