use futures::future::BoxFuture;
use tracing::trace;
use url::Url;

use simplehttp_interface::{Request, Response};

use super::Next;
use crate::{Error, Result};

/// Resolves relative request URIs against a base URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUri {
    base: Url,
}

impl BaseUri {
    /// Creates the plugin from an absolute URI.
    pub fn parse(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Error::invalid_argument(format!("invalid base URI \"{base}\": {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::invalid_argument(format!(
                "\"{base}\" cannot be used as a base URI"
            )));
        }
        Ok(Self { base })
    }

    /// The base URI.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves `uri` against the base. Absolute URIs are returned unchanged.
    pub fn resolve(&self, uri: &str) -> Result<String> {
        if Url::parse(uri).is_ok() {
            return Ok(uri.to_string());
        }
        self.base
            .join(uri)
            .map(String::from)
            .map_err(|e| Error::invalid_argument(format!("cannot resolve \"{uri}\": {e}")))
    }

    pub(super) fn handle<'a>(&'a self, mut req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        match self.resolve(&req.uri) {
            Ok(uri) => {
                trace!(from = %req.uri, to = %uri, "resolved against base URI");
                req.uri = uri;
                next.run(req)
            }
            Err(e) => Box::pin(async move { Err(e) }),
        }
    }
}
