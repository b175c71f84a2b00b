//! The plugin chain.
//!
//! Plugins wrap the transport like layers of an onion: each one receives the request and a
//! [`Next`] handle, may rewrite the request, and decides whether and how to continue. Work done
//! after awaiting `next` observes the response, so response-side effects unwind in reverse
//! registration order.

mod auth;
mod base_uri;
mod cache;
mod query;
mod storage;

use futures::future::BoxFuture;

use simplehttp_interface::{AnyTransport, Request, Response};

use crate::Result;

pub use auth::Authentication;
pub use base_uri::BaseUri;
pub use cache::Cache;
pub(crate) use query::merge_query;
pub use query::QueryDefaults;
pub use storage::PersistToStorage;

/// A request/response interceptor.
#[derive(Debug, Clone)]
pub enum Plugin {
    /// Injects an `Authorization` header.
    Authentication(Authentication),
    /// Adds default query parameters.
    QueryDefaults(QueryDefaults),
    /// Resolves relative URIs against a base.
    BaseUri(BaseUri),
    /// Serves cacheable requests from a cache store.
    Cache(Cache),
    /// Persists response bodies into a storage adapter.
    PersistToStorage(PersistToStorage),
}

impl Plugin {
    /// Handles `req`, continuing with `next`.
    pub fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        match self {
            Plugin::Authentication(p) => p.handle(req, next),
            Plugin::QueryDefaults(p) => p.handle(req, next),
            Plugin::BaseUri(p) => p.handle(req, next),
            Plugin::Cache(p) => p.handle(req, next),
            Plugin::PersistToStorage(p) => p.handle(req, next),
        }
    }

    pub(crate) fn is_authentication(&self) -> bool {
        matches!(self, Plugin::Authentication(_))
    }
}

impl From<Authentication> for Plugin {
    fn from(p: Authentication) -> Self {
        Plugin::Authentication(p)
    }
}

impl From<QueryDefaults> for Plugin {
    fn from(p: QueryDefaults) -> Self {
        Plugin::QueryDefaults(p)
    }
}

impl From<BaseUri> for Plugin {
    fn from(p: BaseUri) -> Self {
        Plugin::BaseUri(p)
    }
}

impl From<Cache> for Plugin {
    fn from(p: Cache) -> Self {
        Plugin::Cache(p)
    }
}

impl From<PersistToStorage> for Plugin {
    fn from(p: PersistToStorage) -> Self {
        Plugin::PersistToStorage(p)
    }
}

/// The rest of the chain after the current plugin.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    plugins: &'a [Plugin],
    transport: &'a dyn AnyTransport,
}

impl<'a> Next<'a> {
    /// Starts a chain over `plugins` that ends in `transport`.
    pub fn new(plugins: &'a [Plugin], transport: &'a dyn AnyTransport) -> Self {
        Self { plugins, transport }
    }

    /// Passes the request to the next plugin, or to the transport at the end of the chain.
    pub fn run(self, req: Request) -> BoxFuture<'a, Result<Response>> {
        match self.plugins.split_first() {
            Some((plugin, rest)) => plugin.handle(
                req,
                Next {
                    plugins: rest,
                    transport: self.transport,
                },
            ),
            None => {
                let transport = self.transport;
                Box::pin(async move { Ok(transport.send(req).await?) })
            }
        }
    }
}
