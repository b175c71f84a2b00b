use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use simplehttp_interface::{upsert_header, HttpVersion, Method, TlsOptions, TransferSettings};

use crate::header;
use crate::progress::ProgressCallback;

/// The request body representation. Exactly one is active at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// A raw payload sent verbatim.
    Text(String),
    /// Form fields, urlencoded unless files are attached.
    Form(Vec<(String, String)>),
    /// A JSON document.
    Json(Value),
}

impl RequestBody {
    /// Whether the body is a structured representation that can be merged into a multipart
    /// payload.
    pub fn is_structured(&self) -> bool {
        matches!(self, RequestBody::Form(_) | RequestBody::Json(_))
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for RequestBody {
    fn from(fields: Vec<(K, V)>) -> Self {
        RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for RequestBody {
    fn from(fields: [(K, V); N]) -> Self {
        Vec::from(fields).into()
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for RequestBody {
    fn from(fields: BTreeMap<K, V>) -> Self {
        fields.into_iter().collect::<Vec<_>>().into()
    }
}

/// A file attached to a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// The file name announced to the server.
    pub filename: Option<String>,
    /// The media type of the part.
    pub content_type: String,
    /// The file contents.
    pub content: Bytes,
    /// Where the contents were read from, if they came from disk.
    pub path: Option<PathBuf>,
}

impl FilePart {
    /// Creates an in-memory part.
    pub fn new(content: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            filename: None,
            content_type: content_type.into(),
            content: content.into(),
            path: None,
        }
    }

    /// Sets the file name announced to the server.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Reads a file from disk, guessing its media type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            content_type,
            content: content.into(),
            path: Some(path.to_path_buf()),
        })
    }
}

/// A writable destination for the response body.
#[derive(Clone)]
pub struct SinkWriter(pub(crate) Arc<Mutex<Pin<Box<dyn AsyncWrite + Send>>>>);

impl SinkWriter {
    /// Wraps a writer. Every request using this sink writes into the same writer.
    pub fn new(writer: impl AsyncWrite + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::pin(writer))))
    }
}

impl fmt::Debug for SinkWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SinkWriter")
    }
}

/// Where the response body is written instead of being buffered in memory.
#[derive(Debug, Clone)]
pub enum Sink {
    /// Truncate and write the file.
    File(PathBuf),
    /// Append to the file, creating it when missing.
    AppendFile(PathBuf),
    /// Write into a caller supplied stream.
    Writer(SinkWriter),
}

/// HTTP authentication credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP Basic authentication.
    Basic {
        /// The user name.
        username: String,
        /// The password, sent as empty when absent.
        password: Option<String>,
    },
    /// Bearer token authentication.
    Bearer(String),
}

/// An opaque caller value echoed back by the response.
pub type UserData = Arc<dyn Any + Send + Sync>;

/// Every configurable parameter of a pending request.
///
/// The builder treats this record as copy-on-write: each chained call clones it and changes
/// the copy. It can also be filled in directly and handed to
/// [`crate::RequestBuilder::with_options`].
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// The target URL, absolute or relative to a registered base URI.
    pub url: Option<String>,
    /// The request method.
    pub method: Method,
    /// Request headers in insertion order. Names compare case-insensitively.
    pub headers: Vec<(String, String)>,
    /// The body representation.
    pub body: RequestBody,
    /// Files attached as multipart parts, keyed by field name.
    pub files: Vec<(String, FilePart)>,
    /// Default query parameters, added when absent from the URL.
    pub query: Vec<(String, String)>,
    /// Authentication credentials.
    pub auth: Option<Auth>,
    /// TLS options.
    pub tls: TlsOptions,
    /// The protocol version.
    pub http_version: HttpVersion,
    /// Idle timeout.
    pub timeout: Option<Duration>,
    /// Total transfer time limit.
    pub max_duration: Option<Duration>,
    /// Redirect limit.
    pub max_redirects: Option<u32>,
    /// Proxy URL.
    pub proxy: Option<String>,
    /// Hosts that bypass the proxy.
    pub no_proxy: Option<String>,
    /// Local address to bind to.
    pub bind_to: Option<IpAddr>,
    /// Host name overrides.
    pub resolve: Vec<(String, IpAddr)>,
    /// Transport-specific extras.
    pub extra: BTreeMap<String, String>,
    /// Progress callback.
    pub on_progress: Option<ProgressCallback>,
    /// Response body destination.
    pub sink: Option<Sink>,
    /// Opaque value echoed back through the response.
    pub user_data: Option<UserData>,
}

impl RequestOptions {
    /// Sets a header, replacing any header with the same name regardless of case.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        upsert_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Sets the body, replacing any previous representation.
    ///
    /// Form fields also set the urlencoded content type.
    pub fn body(&mut self, body: impl Into<RequestBody>) -> &mut Self {
        let body = body.into();
        if let RequestBody::Form(_) = body {
            self.header(header::CONTENT_TYPE, header::FORM_URLENCODED);
        }
        self.body = body;
        self
    }

    /// Sets a JSON body along with JSON `Content-Type` and `Accept` headers.
    pub fn json(&mut self, json: Value) -> &mut Self {
        self.header(header::CONTENT_TYPE, header::APPLICATION_JSON);
        self.header(header::ACCEPT, header::APPLICATION_JSON);
        self.body = RequestBody::Json(json);
        self
    }

    /// Attaches a file part, replacing any part with the same field name.
    pub fn add_file(&mut self, field: impl Into<String>, part: FilePart) -> &mut Self {
        let field = field.into();
        match self.files.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = part,
            None => self.files.push((field, part)),
        }
        self
    }

    /// Adds default query parameters. Later values for the same key win.
    pub fn query<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            let (k, v) = (k.into(), v.into());
            match self.query.iter_mut().find(|(name, _)| *name == k) {
                Some(slot) => slot.1 = v,
                None => self.query.push((k, v)),
            }
        }
        self
    }

    /// Uses HTTP Basic authentication.
    pub fn basic_auth(&mut self, username: impl Into<String>, password: Option<String>) -> &mut Self {
        self.auth = Some(Auth::Basic {
            username: username.into(),
            password,
        });
        self
    }

    /// Uses bearer token authentication.
    pub fn bearer_auth(&mut self, token: impl Into<String>) -> &mut Self {
        self.auth = Some(Auth::Bearer(token.into()));
        self
    }

    /// Toggles peer certificate verification.
    pub fn verify_peer(&mut self, verify: bool) -> &mut Self {
        self.tls.verify_peer = verify;
        self
    }

    /// Toggles host name verification.
    pub fn verify_host(&mut self, verify: bool) -> &mut Self {
        self.tls.verify_host = verify;
        self
    }

    /// The transport-level settings derived from these options.
    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            tls: self.tls.clone(),
            timeout: self.timeout,
            max_duration: self.max_duration,
            max_redirects: self.max_redirects,
            proxy: self.proxy.clone(),
            no_proxy: self.no_proxy.clone(),
            bind_to: self.bind_to,
            resolve: self.resolve.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("files", &self.files)
            .field("query", &self.query)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .field("tls", &self.tls)
            .field("http_version", &self.http_version)
            .field("timeout", &self.timeout)
            .field("max_duration", &self.max_duration)
            .field("max_redirects", &self.max_redirects)
            .field("proxy", &self.proxy)
            .field("no_proxy", &self.no_proxy)
            .field("bind_to", &self.bind_to)
            .field("resolve", &self.resolve)
            .field("extra", &self.extra)
            .field("on_progress", &self.on_progress)
            .field("sink", &self.sink)
            .field("user_data", &self.user_data.is_some())
            .finish()
    }
}
