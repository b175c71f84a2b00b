use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use simplehttp_interface::Method;

/// Transfer metadata attached to every progress tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    /// The URL the response is being received from.
    pub url: String,
    /// The method of the request.
    pub http_method: Method,
    /// Time since the transfer started.
    pub elapsed: Duration,
}

/// A download progress report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Bytes of the response body received so far.
    pub downloaded: u64,
    /// The expected body size, if the transport announced one.
    pub total: Option<u64>,
    /// Transfer metadata.
    pub info: ProgressInfo,
}

/// A shared progress callback.
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(&Progress) + Send + Sync>);

impl ProgressCallback {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, progress: &Progress) {
        (self.0)(progress)
    }

    /// Whether both callbacks are the same closure instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressCallback")
    }
}
