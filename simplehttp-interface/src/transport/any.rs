//! Type-erased transport interface.
//!
//! [`AnyTransport`] is automatically implemented for types that implement
//! [`Transport`](super::Transport), so transport developers don't need to implement it
//! directly.

use std::any::Any;
use std::fmt;

use futures_core::future::BoxFuture;

use crate::request::Request;
use crate::response::Response;
use crate::Result;

/// Trait for type-erased transports.
///
/// Automatically implemented for types implementing `Transport`.
pub trait AnyTransport: Any + Send + Sync + 'static {
    /// Provides a textual description of this transport.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    /// Sends a request and returns the response.
    fn send(&self, req: Request) -> BoxFuture<'_, Result<Response>>;
}

impl<T> AnyTransport for T
where
    T: super::backend::Transport,
{
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        super::backend::Transport::describe(self, f)
    }

    fn send(&self, req: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin(super::backend::Transport::send(self, req))
    }
}

impl fmt::Debug for dyn AnyTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f)
    }
}
