//! Core transport trait.
//!
//! Transport implementations receive a fully built request and resolve it into a response
//! whose body is still streaming. Redirect handling, TLS, proxies and connection reuse all
//! happen behind this trait.

use std::fmt;
use std::future::Future;

use crate::request::Request;
use crate::response::Response;
use crate::Result;

/// Trait for asynchronous HTTP transports.
///
/// Transports must be cheap to share: the request builder keeps one behind an `Arc` and
/// every chained builder refers to the same instance.
pub trait Transport: Send + Sync + 'static {
    /// Provides a textual description of this transport.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transport")
    }

    /// Sends a request and returns a future that resolves to the response head and a
    /// streaming body.
    ///
    /// Failures to reach the server are reported through the future, never by panicking.
    /// A transport may decide whether non-2xx statuses are errors; the default expectation
    /// is that they are returned as ordinary responses.
    fn send(&self, req: Request) -> impl Future<Output = Result<Response>> + Send;
}
