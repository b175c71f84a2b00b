use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{debug, trace, warn};

use simplehttp_interface::{Method, Request, Response, TransferInfo};

use super::Next;
use crate::cache::{CacheStore, CachedResponse};
use crate::Result;

/// Serves cacheable requests from a [`CacheStore`] and stores fresh responses in it.
///
/// `POST`, `PUT`, `PATCH` and `DELETE` requests always go to the next plugin.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    ttl: Option<Duration>,
}

impl Cache {
    /// Creates the plugin. A zero `ttl` keeps entries until evicted.
    pub fn new(store: Arc<dyn CacheStore>, ttl: Option<Duration>) -> Self {
        Self {
            store,
            ttl: ttl.filter(|ttl| !ttl.is_zero()),
        }
    }

    /// The key a request is cached under: the hex MD5 digest of the method followed by the
    /// URI.
    pub fn cache_key(method: Method, uri: &str) -> String {
        format!("{:x}", md5::compute(format!("{method}{uri}")))
    }

    pub(super) fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        if !req.method.is_cacheable() {
            return next.run(req);
        }
        Box::pin(async move {
            let key = Self::cache_key(req.method, &req.uri);
            let lookup_ok = match self.store.get(&key).await {
                Ok(Some(hit)) => {
                    debug!(%key, uri = %req.uri, "cache hit");
                    return Ok(hit.into_response(TransferInfo::new(req.method, req.uri)));
                }
                Ok(None) => {
                    trace!(%key, "cache miss");
                    true
                }
                Err(e) => {
                    warn!(%key, error = %e, "cache lookup failed, treating as a miss");
                    false
                }
            };

            let res = next.run(req).await?;
            if !lookup_ok {
                return Ok(res);
            }

            let Response {
                status,
                reason,
                headers,
                version,
                body,
                info,
            } = res;
            let cached = CachedResponse {
                status,
                reason,
                headers,
                version,
                body: body.collect().await?,
            };
            if let Err(e) = self.store.set(&key, cached.clone(), self.ttl).await {
                warn!(%key, error = %e, "failed to store response in cache");
            }
            Ok(cached.into_response(info))
        })
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
