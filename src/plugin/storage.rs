use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use simplehttp_interface::{Request, Response, ResponseBody};

use super::Next;
use crate::storage::Storage;
use crate::Result;

/// Writes the response body into a storage adapter and replaces it with the persisted copy.
///
/// Status, reason, headers and protocol version of the response are kept.
#[derive(Clone)]
pub struct PersistToStorage {
    storage: Arc<dyn Storage>,
    path: String,
}

impl PersistToStorage {
    /// Creates the plugin writing to `path` within `storage`.
    pub fn new(storage: Arc<dyn Storage>, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    /// The object path responses are written to.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(super) fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let mut res = next.run(req).await?;
            let body = std::mem::replace(&mut res.body, ResponseBody::empty());
            self.storage.write_stream(&self.path, body).await?;
            debug!(path = %self.path, "response body persisted to storage");
            res.body = self.storage.read_stream(&self.path).await?;
            Ok(res)
        })
    }
}

impl fmt::Debug for PersistToStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistToStorage")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::executor::block_on;

    use super::*;
    use crate::mock::MockTransport;
    use crate::plugin::Plugin;
    use crate::storage::MemoryStorage;

    #[test]
    fn keeps_head_and_replaces_body() {
        let storage = Arc::new(MemoryStorage::new());
        let transport = MockTransport::new();
        let mut upstream = Response::new(
            202,
            "payload",
            simplehttp_interface::TransferInfo::new(
                simplehttp_interface::Method::Get,
                "https://example.com",
            ),
        );
        upstream.reason = Some("Accepted".into());
        upstream.headers.push(("X-Id".into(), "7".into()));
        transport.push(upstream);

        let plugins = [Plugin::from(PersistToStorage::new(storage.clone(), "file.txt"))];
        let res = block_on(Next::new(&plugins, &transport).run(Request::new(
            simplehttp_interface::Method::Get,
            "https://example.com",
        )))
        .unwrap();

        assert_eq!(res.status, 202);
        assert_eq!(res.reason.as_deref(), Some("Accepted"));
        assert_eq!(res.header("x-id"), Some("7"));
        assert_eq!(storage.get("file.txt"), Some(Bytes::from("payload")));
        assert_eq!(block_on(res.body.collect()).unwrap(), Bytes::from("payload"));
    }
}
