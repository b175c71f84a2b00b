use std::any::Any;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWrite;
use url::Url;

use simplehttp_interface::{AnyTransport, HttpVersion, Method, Request, TlsOptions, Transport};

use crate::cache::CacheStore;
use crate::compose::build_request;
use crate::dispatch::Dispatch;
use crate::options::{Auth, FilePart, RequestBody, RequestOptions, Sink, SinkWriter};
use crate::plugin::{Authentication, BaseUri, Cache, PersistToStorage, Plugin};
use crate::progress::{Progress, ProgressCallback};
use crate::storage::Storage;
use crate::{Error, Response, Result};

/// Creates a builder root that dispatches through `transport`.
pub fn create(transport: impl Transport) -> RequestBuilder {
    RequestBuilder::new(Arc::new(transport))
}

/// An immutable, fluent request builder.
///
/// Every configuration method leaves `self` untouched and returns a new builder. Invalid
/// arguments that cannot be rejected through the signature are remembered per option and
/// reported by [`RequestBuilder::build`] and [`RequestBuilder::request`], oldest first. A later
/// valid value for the same option forgets the error.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    transport: Arc<dyn AnyTransport>,
    options: RequestOptions,
    plugins: Vec<Plugin>,
    invalid: Vec<(String, String)>,
}

impl RequestBuilder {
    /// Creates a builder root over an already shared transport.
    pub fn new(transport: Arc<dyn AnyTransport>) -> Self {
        Self {
            transport,
            options: RequestOptions::default(),
            plugins: vec![],
            invalid: vec![],
        }
    }

    fn with(&self, f: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        f(&mut next);
        next
    }

    /// Records the error for `option`, replacing an earlier one for the same option.
    fn invalidate(&mut self, option: impl Into<String>, message: impl Into<String>) {
        let option = option.into();
        self.validate(&option);
        self.invalid.push((option, message.into()));
    }

    fn validate(&mut self, option: &str) {
        self.invalid.retain(|(key, _)| key != option);
    }

    fn has_base_uri(&self) -> bool {
        self.plugins.iter().any(|p| matches!(p, Plugin::BaseUri(_)))
    }

    /// Sets the target URL. Relative URLs need a base URI registered first.
    #[must_use]
    pub fn url(&self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.with(|b| {
            match Url::parse(&url) {
                Ok(_) => b.validate("url"),
                Err(url::ParseError::RelativeUrlWithoutBase) if b.has_base_uri() => {
                    b.validate("url")
                }
                Err(url::ParseError::RelativeUrlWithoutBase) => b.invalidate(
                    "url",
                    format!("\"{url}\" is relative; call set_base_uri() before url()"),
                ),
                Err(e) => b.invalidate("url", format!("invalid URL \"{url}\": {e}")),
            }
            b.options.url = Some(url);
        })
    }

    /// Sets the method by name, ignoring case.
    #[must_use]
    pub fn method(&self, method: impl AsRef<str>) -> Self {
        let method = method.as_ref();
        self.with(|b| match method.parse::<Method>() {
            Ok(m) => {
                b.validate("method");
                b.options.method = m;
            }
            Err(e) => b.invalidate("method", e.to_string()),
        })
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(&self, method: Method) -> Self {
        self.with(|b| {
            b.validate("method");
            b.options.method = method;
        })
    }

    /// Uses `GET`.
    #[must_use]
    pub fn get(&self) -> Self {
        self.with_method(Method::Get)
    }

    /// Uses `POST`.
    #[must_use]
    pub fn post(&self) -> Self {
        self.with_method(Method::Post)
    }

    /// Uses `PUT`.
    #[must_use]
    pub fn put(&self) -> Self {
        self.with_method(Method::Put)
    }

    /// Uses `PATCH`.
    #[must_use]
    pub fn patch(&self) -> Self {
        self.with_method(Method::Patch)
    }

    /// Uses `DELETE`.
    #[must_use]
    pub fn delete(&self) -> Self {
        self.with_method(Method::Delete)
    }

    /// Uses `OPTIONS`.
    #[must_use]
    pub fn options(&self) -> Self {
        self.with_method(Method::Options)
    }

    /// Uses `HEAD`.
    #[must_use]
    pub fn head(&self) -> Self {
        self.with_method(Method::Head)
    }

    /// Uses `TRACE`.
    #[must_use]
    pub fn trace(&self) -> Self {
        self.with_method(Method::Trace)
    }

    /// Uses `CONNECT`.
    #[must_use]
    pub fn connect(&self) -> Self {
        self.with_method(Method::Connect)
    }

    /// Sets a header. A later call with the same name, in any case, replaces it.
    #[must_use]
    pub fn header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(|b| {
            b.options.header(name, value);
        })
    }

    /// Sets several headers.
    #[must_use]
    pub fn headers<K, V>(&self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.with(|b| {
            for (k, v) in headers {
                b.options.header(k, v);
            }
        })
    }

    /// Adds default query parameters, merged by the Build Step when the URL does not already
    /// carry them.
    #[must_use]
    pub fn query<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.with(|b| {
            b.options.query(params);
        })
    }

    /// Sets the body. Strings are sent verbatim, field lists are urlencoded.
    #[must_use]
    pub fn body(&self, body: impl Into<RequestBody>) -> Self {
        let body = body.into();
        self.with(|b| {
            b.validate("body");
            b.options.body(body);
        })
    }

    /// Sets the body from a JSON value, which must be a string or an object of scalars.
    pub fn body_value(&self, value: Value) -> Result<Self> {
        let body = match value {
            Value::String(s) => RequestBody::Text(s),
            Value::Object(map) => RequestBody::Form(
                map.into_iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => (k, s),
                        other => (k, other.to_string()),
                    })
                    .collect(),
            ),
            other => {
                return Err(Error::invalid_argument(format!(
                    "the body must be a string or an object, got {other}"
                )))
            }
        };
        Ok(self.body(body))
    }

    /// Alias of [`RequestBuilder::body`] for form fields.
    #[must_use]
    pub fn form_data<K, V>(&self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Vec<(String, String)> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body(fields)
    }

    /// Sends `value` as JSON with JSON `Content-Type` and `Accept` headers.
    #[must_use]
    pub fn json(&self, value: impl Serialize) -> Self {
        let json = serde_json::to_value(value);
        self.with(|b| match json {
            Ok(json) => {
                b.validate("body");
                b.options.json(json);
            }
            Err(e) => b.invalidate("body", format!("cannot encode JSON body: {e}")),
        })
    }

    /// Attaches a file from disk as a multipart part.
    #[must_use]
    pub fn upload_file(&self, field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let (field, path) = (field.into(), path.into());
        self.with(|b| match FilePart::from_path(&path) {
            Ok(part) => {
                b.validate(&format!("upload:{field}"));
                b.options.add_file(field, part);
            }
            Err(e) => b.invalidate(
                format!("upload:{field}"),
                format!("cannot read \"{}\": {e}", path.display()),
            ),
        })
    }

    /// Attaches an in-memory multipart part.
    #[must_use]
    pub fn upload_part(&self, field: impl Into<String>, part: FilePart) -> Self {
        let field = field.into();
        self.with(|b| {
            b.validate(&format!("upload:{field}"));
            b.options.add_file(field, part);
        })
    }

    fn authenticate(&self, auth: Auth) -> Self {
        self.with(|b| {
            b.options.auth = Some(auth.clone());
            let plugin = Plugin::from(Authentication::new(auth));
            match b.plugins.iter_mut().find(|p| p.is_authentication()) {
                Some(slot) => *slot = plugin,
                None => b.plugins.push(plugin),
            }
        })
    }

    /// Uses HTTP Basic authentication, replacing any earlier credentials.
    #[must_use]
    pub fn basic_auth(&self, username: impl Into<String>, password: Option<&str>) -> Self {
        self.authenticate(Auth::Basic {
            username: username.into(),
            password: password.map(String::from),
        })
    }

    /// Uses a bearer token, replacing any earlier credentials.
    #[must_use]
    pub fn bearer_token(&self, token: impl Into<String>) -> Self {
        self.authenticate(Auth::Bearer(token.into()))
    }

    /// Turns off peer and host verification.
    #[must_use]
    pub fn disable_ssl_verification(&self) -> Self {
        self.with(|b| {
            b.options.verify_peer(false).verify_host(false);
        })
    }

    /// Replaces all TLS options.
    #[must_use]
    pub fn tls(&self, tls: TlsOptions) -> Self {
        self.with(|b| b.options.tls = tls)
    }

    /// Toggles peer certificate verification.
    #[must_use]
    pub fn verify_peer(&self, verify: bool) -> Self {
        self.with(|b| b.options.tls.verify_peer = verify)
    }

    /// Toggles host name verification.
    #[must_use]
    pub fn verify_host(&self, verify: bool) -> Self {
        self.with(|b| b.options.tls.verify_host = verify)
    }

    /// Trusts the certificates in this PEM file.
    #[must_use]
    pub fn cafile(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.with(|b| b.options.tls.cafile = Some(path))
    }

    /// Trusts the certificates in this directory.
    #[must_use]
    pub fn capath(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.with(|b| b.options.tls.capath = Some(path))
    }

    /// Presents this client certificate.
    #[must_use]
    pub fn local_cert(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.with(|b| b.options.tls.local_cert = Some(path))
    }

    /// Uses this private key for the client certificate.
    #[must_use]
    pub fn local_pk(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.with(|b| b.options.tls.local_pk = Some(path))
    }

    /// Unlocks the private key.
    #[must_use]
    pub fn passphrase(&self, passphrase: impl Into<String>) -> Self {
        let passphrase = passphrase.into();
        self.with(|b| b.options.tls.passphrase = Some(passphrase))
    }

    /// Restricts the cipher list.
    #[must_use]
    pub fn ciphers(&self, ciphers: impl Into<String>) -> Self {
        let ciphers = ciphers.into();
        self.with(|b| b.options.tls.ciphers = Some(ciphers))
    }

    /// Pins the peer certificate fingerprint.
    #[must_use]
    pub fn peer_fingerprint(&self, fingerprint: impl Into<String>) -> Self {
        let fingerprint = fingerprint.into();
        self.with(|b| b.options.tls.peer_fingerprint = Some(fingerprint))
    }

    /// Asks the transport to keep the peer certificate chain.
    #[must_use]
    pub fn capture_peer_cert_chain(&self, capture: bool) -> Self {
        self.with(|b| b.options.tls.capture_peer_cert_chain = capture)
    }

    /// Registers a progress callback.
    #[must_use]
    pub fn progress(&self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        let callback = ProgressCallback::new(callback);
        self.with(|b| b.options.on_progress = Some(callback))
    }

    /// Writes the response body to `path`, truncating it.
    #[must_use]
    pub fn save_to_file(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.with(|b| b.options.sink = Some(Sink::File(path)))
    }

    /// Appends the response body to `path`, creating it when missing.
    #[must_use]
    pub fn append_to_file(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.with(|b| b.options.sink = Some(Sink::AppendFile(path)))
    }

    /// Streams the response body into `writer`.
    #[must_use]
    pub fn save_to_writer(&self, writer: impl AsyncWrite + Send + 'static) -> Self {
        let writer = SinkWriter::new(writer);
        self.with(|b| b.options.sink = Some(Sink::Writer(writer)))
    }

    /// Persists the response body into `storage` at `path`.
    #[must_use]
    pub fn save_to(&self, storage: Arc<dyn Storage>, path: impl Into<String>) -> Self {
        let plugin = PersistToStorage::new(storage, path);
        self.with(|b| b.plugins.push(plugin.into()))
    }

    /// Caches responses to cacheable requests in `store`.
    #[must_use]
    pub fn cache(&self, store: Arc<dyn CacheStore>, ttl: Option<Duration>) -> Self {
        let plugin = Cache::new(store, ttl);
        self.with(|b| b.plugins.push(plugin.into()))
    }

    /// Resolves relative URLs against `base`.
    #[must_use]
    pub fn set_base_uri(&self, base: &str) -> Self {
        let plugin = BaseUri::parse(base);
        self.with(|b| match plugin {
            Ok(plugin) => {
                b.validate("base_uri");
                let plugin = Plugin::from(plugin);
                match b.plugins.iter_mut().find(|p| matches!(p, Plugin::BaseUri(_))) {
                    Some(slot) => *slot = plugin,
                    None => b.plugins.push(plugin),
                }
            }
            Err(e) => b.invalidate("base_uri", e.to_string()),
        })
    }

    /// Registers any plugin at the end of the chain.
    #[must_use]
    pub fn with_plugin(&self, plugin: impl Into<Plugin>) -> Self {
        let plugin = plugin.into();
        self.with(|b| b.plugins.push(plugin))
    }

    /// Sets the protocol version.
    #[must_use]
    pub fn http_version(&self, version: HttpVersion) -> Self {
        self.with(|b| b.options.http_version = version)
    }

    /// Uses HTTP/2.
    #[must_use]
    pub fn http2(&self) -> Self {
        self.http_version(HttpVersion::Http2)
    }

    /// Sets the idle timeout.
    #[must_use]
    pub fn timeout(&self, timeout: Duration) -> Self {
        self.with(|b| b.options.timeout = Some(timeout))
    }

    /// Limits the total transfer time.
    #[must_use]
    pub fn max_duration(&self, max_duration: Duration) -> Self {
        self.with(|b| b.options.max_duration = Some(max_duration))
    }

    /// Limits how many redirects are followed.
    #[must_use]
    pub fn max_redirects(&self, max_redirects: u32) -> Self {
        self.with(|b| b.options.max_redirects = Some(max_redirects))
    }

    /// Sends requests through this proxy URL.
    #[must_use]
    pub fn proxy(&self, proxy: impl Into<String>) -> Self {
        let proxy = proxy.into();
        self.with(|b| b.options.proxy = Some(proxy))
    }

    /// Comma separated hosts that bypass the proxy.
    #[must_use]
    pub fn no_proxy(&self, hosts: impl Into<String>) -> Self {
        let hosts = hosts.into();
        self.with(|b| b.options.no_proxy = Some(hosts))
    }

    /// Binds the connection to a local address.
    #[must_use]
    pub fn bind_to(&self, addr: IpAddr) -> Self {
        self.with(|b| b.options.bind_to = Some(addr))
    }

    /// Resolves `host` to `addr` instead of using DNS.
    #[must_use]
    pub fn resolve(&self, host: impl Into<String>, addr: IpAddr) -> Self {
        let host = host.into();
        self.with(|b| {
            b.options.resolve.retain(|(h, _)| *h != host);
            b.options.resolve.push((host, addr));
        })
    }

    /// Sets a transport-specific option.
    #[must_use]
    pub fn extra(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.with(|b| {
            b.options.extra.insert(key, value);
        })
    }

    /// Attaches a value that the response hands back.
    #[must_use]
    pub fn user_data(&self, data: impl Any + Send + Sync) -> Self {
        let data: Arc<dyn Any + Send + Sync> = Arc::new(data);
        self.with(|b| b.options.user_data = Some(data))
    }

    /// Replaces the whole option record, keeping the authentication plugin in step with it.
    ///
    /// Errors recorded for options the record carries are forgotten.
    #[must_use]
    pub fn with_options(&self, options: RequestOptions) -> Self {
        self.with(|b| {
            b.invalid.retain(|(key, _)| key == "base_uri");
            b.plugins.retain(|p| !p.is_authentication());
            if let Some(auth) = &options.auth {
                b.plugins.push(Authentication::new(auth.clone()).into());
            }
            b.options = options;
        })
    }

    /// The accumulated options.
    pub fn request_options(&self) -> &RequestOptions {
        &self.options
    }

    /// The registered plugins in chain order.
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// The URL set so far.
    pub fn url_value(&self) -> Option<&str> {
        self.options.url.as_deref()
    }

    /// The transport requests are sent through.
    pub fn transport(&self) -> &Arc<dyn AnyTransport> {
        &self.transport
    }

    /// Runs the Build Step without sending anything.
    pub fn build(&self) -> Result<Request> {
        if let Some((_, message)) = self.invalid.first() {
            return Err(Error::InvalidArgument(message.clone()));
        }
        build_request(&self.options)
    }

    /// Builds the request and hands it to the plugin chain.
    ///
    /// Configuration errors are returned here. Transport errors surface from the response
    /// accessors.
    pub fn request(&self) -> Result<Response> {
        let req = self.build()?;
        let dispatch = Dispatch {
            transport: self.transport.clone(),
            plugins: self.plugins.clone(),
            on_progress: self.options.on_progress.clone(),
            sink: self.options.sink.clone(),
        };
        Ok(Response::pending(
            dispatch.send(req),
            self.options.user_data.clone(),
        ))
    }
}
