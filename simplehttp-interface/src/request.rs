//! Concrete request messages handed to a transport.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::TransferSettings;

/// The standard HTTP request methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `OPTIONS`
    Options,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `TRACE`
    Trace,
    /// `CONNECT`
    Connect,
}

/// The error returned when a string is not one of the standard HTTP methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported HTTP method \"{0}\"")]
pub struct ParseMethodError(pub String);

impl Method {
    /// All supported methods.
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Options,
        Method::Delete,
        Method::Head,
        Method::Trace,
        Method::Connect,
    ];

    /// The uppercase method token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }

    /// Whether responses to this method may be served from a cache.
    ///
    /// `POST`, `PUT`, `PATCH` and `DELETE` are never cached.
    pub fn is_cacheable(&self) -> bool {
        !matches!(
            self,
            Method::Post | Method::Put | Method::Patch | Method::Delete
        )
    }
}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseMethodError(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The HTTP protocol version requested for a transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpVersion {
    /// HTTP/1.1
    #[default]
    #[serde(rename = "1.1")]
    Http11,
    /// HTTP/2
    #[serde(rename = "2.0")]
    Http2,
}

/// The error returned when a string does not name a supported HTTP version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported HTTP version \"{0}\"")]
pub struct ParseHttpVersionError(pub String);

impl HttpVersion {
    /// The version number as written in a status line, e.g. `1.1`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Http11 => "1.1",
            HttpVersion::Http2 => "2.0",
        }
    }
}

impl FromStr for HttpVersion {
    type Err = ParseHttpVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_prefix("HTTP/")
            .or_else(|| trimmed.strip_prefix("http/"))
            .unwrap_or(trimmed);
        match number {
            "1.1" => Ok(HttpVersion::Http11),
            "2" | "2.0" => Ok(HttpVersion::Http2),
            _ => Err(ParseHttpVersionError(s.to_string())),
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready to be sent by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The request method.
    pub method: Method,
    /// The request URI. Plugins may rewrite it before it reaches the transport, so it can be
    /// relative until a base URI has been applied.
    pub uri: String,
    /// Request headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// The encoded request body. Empty when the request carries no body.
    pub body: Bytes,
    /// The protocol version to negotiate.
    pub version: HttpVersion,
    /// Transport-level settings for this transfer.
    pub settings: TransferSettings,
}

impl Request {
    /// Creates a bodiless request with default settings.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: vec![],
            body: Bytes::new(),
            version: HttpVersion::default(),
            settings: TransferSettings::default(),
        }
    }

    /// Gets the last value of a header, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::find_header(&self.headers, name)
    }

    /// Sets a header, replacing any existing header with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        crate::upsert_header(&mut self.headers, name.into(), value.into());
    }
}
