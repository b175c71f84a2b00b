//! Storage adapters that response bodies can be persisted into.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use simplehttp_interface::ResponseBody;

use crate::{Error, Result};

/// A destination that can receive a response body and hand it back as a stream.
pub trait Storage: Send + Sync + 'static {
    /// Writes the whole body to `path`, replacing any existing object.
    fn write_stream<'a>(&'a self, path: &'a str, body: ResponseBody) -> BoxFuture<'a, Result<()>>;

    /// Opens a previously written object.
    ///
    /// Write-only adapters keep the provided implementation, which fails with
    /// [`Error::NotImplemented`].
    fn read_stream<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<ResponseBody>> {
        let _ = path;
        Box::pin(async {
            Err(Error::NotImplemented {
                method: "read_stream",
            })
        })
    }
}

/// Stores objects as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Creates an adapter rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The file an object path maps to. Paths may not escape the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::invalid_argument(format!(
                "storage path \"{path}\" leaves the storage root"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl Storage for LocalStorage {
    fn write_stream<'a>(&'a self, path: &'a str, mut body: ResponseBody) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let target = self.resolve(path)?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let mut file = tokio::fs::File::create(&target).await?;
            while let Some(chunk) = body.next().await {
                file.write_all(&chunk?).await?;
            }
            file.flush().await?;
            Ok(())
        })
    }

    fn read_stream<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<ResponseBody>> {
        Box::pin(async move {
            let target = self.resolve(path)?;
            let content = tokio::fs::read(&target).await?;
            Ok(ResponseBody::from_bytes(content))
        })
    }
}

/// Keeps objects in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored content of `path`.
    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }
}

impl Storage for MemoryStorage {
    fn write_stream<'a>(&'a self, path: &'a str, body: ResponseBody) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let content = body.collect().await?;
            self.objects
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(path.to_string(), content);
            Ok(())
        })
    }

    fn read_stream<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<ResponseBody>> {
        Box::pin(async move {
            self.get(path).map(ResponseBody::from_bytes).ok_or_else(|| {
                Error::from(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no object stored at \"{path}\""),
                ))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WriteOnly;

    impl Storage for WriteOnly {
        fn write_stream<'a>(&'a self, _: &'a str, _: ResponseBody) -> BoxFuture<'a, Result<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn local_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .write_stream("nested/out.txt", ResponseBody::from_bytes("payload"))
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("nested/out.txt")).unwrap(),
            "payload"
        );
        let body = storage.read_stream("nested/out.txt").await.unwrap();
        assert_eq!(body.collect().await.unwrap(), Bytes::from("payload"));
    }

    #[test]
    fn local_storage_rejects_escape() {
        let storage = LocalStorage::new("/tmp/root");
        assert!(matches!(
            storage.resolve("../etc/passwd"),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            storage.resolve("/a/b").unwrap(),
            PathBuf::from("/tmp/root/a/b")
        );
    }

    #[tokio::test]
    async fn memory_storage_missing_object() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.read_stream("nope").await,
            Err(Error::Io(_))
        ));
    }

    #[tokio::test]
    async fn write_only_adapter_cannot_read() {
        assert!(matches!(
            WriteOnly.read_stream("x").await,
            Err(Error::NotImplemented {
                method: "read_stream"
            })
        ));
    }
}
