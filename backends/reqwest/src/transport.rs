use std::future::Future;
use std::io;
use std::sync::{Arc, OnceLock};
use std::time::{Instant, SystemTime};

use http::StatusCode;
use simplehttp_interface::{remove_header, Method, Request, Response, TransferInfo, Transport};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, trace};
use url::Url;

use crate::client::{ClientCache, ClientKey};
use crate::error::{ReqwestTransportError, Result};
use crate::request::{build_hop, parse_url};
use crate::response::convert_response;

/// Redirect limit applied when the request does not set one.
pub const DEFAULT_MAX_REDIRECTS: u32 = 20;

#[derive(Default)]
struct Inner {
    clients: ClientCache,
    managed_runtime: OnceLock<Runtime>,
}

/// A [`Transport`] backed by reqwest.
///
/// Inside a tokio runtime requests run on it. Elsewhere a single-worker runtime owned by the
/// transport is started on first use.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    inner: Arc<Inner>,
}

impl ReqwestTransport {
    /// Creates a transport with an empty client cache.
    pub fn new() -> Self {
        Self::default()
    }

    async fn send_inner(&self, req: Request) -> Result<Response> {
        let started = Instant::now();
        let start_time = SystemTime::now();
        let max_redirects = req.settings.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS);

        let mut url = parse_url(&req.uri)?;
        let mut method = req.method;
        let mut headers = req.headers.clone();
        let mut body = req.body.clone();
        let mut redirect_count = 0;

        if !req.settings.extra.is_empty() {
            trace!(keys = ?req.settings.extra.keys().collect::<Vec<_>>(), "ignoring transport extras");
        }

        loop {
            let client = self
                .inner
                .clients
                .get_or_build(ClientKey::for_request(&req, url.scheme() == "http"))?;
            let mut hop = build_hop(&client, method, url.clone(), &headers, &body)?;
            if let Some(max_duration) = req.settings.max_duration {
                let remaining = max_duration
                    .checked_sub(started.elapsed())
                    .filter(|d| !d.is_zero())
                    .ok_or(ReqwestTransportError::Timeout)?;
                hop = hop.timeout(remaining);
            }

            let (response, handle) =
                execute_with_runtime_async(&self.inner.managed_runtime, || async move {
                    hop.send().await.map_err(ReqwestTransportError::Reqwest)
                })
                .await?;
            let response = response?;

            let mut info = TransferInfo::new(method, url.as_str());
            info.start_time = start_time;
            info.redirect_count = redirect_count;

            let Some(next) = redirect_target(&url, &response) else {
                info.total_time = started.elapsed();
                return Ok(convert_response(response, handle, info));
            };
            if redirect_count >= max_redirects {
                trace!(%next, max_redirects, "redirect limit reached");
                info.redirect_url = Some(next.into());
                info.total_time = started.elapsed();
                return Ok(convert_response(response, handle, info));
            }

            let status = response.status();
            drop(response);
            let downgrade = match status {
                StatusCode::SEE_OTHER => method != Method::Head,
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => method == Method::Post,
                _ => false,
            };
            if downgrade {
                method = Method::Get;
                body = Default::default();
                remove_header(&mut headers, "content-type");
                remove_header(&mut headers, "content-length");
            }
            if next.host_str() != url.host_str()
                || next.port_or_known_default() != url.port_or_known_default()
            {
                remove_header(&mut headers, "authorization");
            }
            redirect_count += 1;
            debug!(from = %url, to = %next, %status, redirect_count, "following redirect");
            url = next;
        }
    }
}

fn redirect_target(current: &Url, response: &reqwest::Response) -> Option<Url> {
    if !matches!(response.status().as_u16(), 301 | 302 | 303 | 307 | 308) {
        return None;
    }
    let location = response.headers().get(http::header::LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

impl Transport for ReqwestTransport {
    fn describe(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReqwestTransport")
    }

    async fn send(&self, req: Request) -> simplehttp_interface::Result<Response> {
        self.send_inner(req).await.map_err(Into::into)
    }
}

fn create_managed_runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .thread_name("simplehttp-reqwest")
        .worker_threads(1)
        .enable_all()
        .build()
}

fn managed_runtime(cell: &OnceLock<Runtime>) -> io::Result<&Runtime> {
    if let Some(runtime) = cell.get() {
        return Ok(runtime);
    }
    // Losing a race drops the spare runtime; this only happens outside any runtime.
    let _ = cell.set(create_managed_runtime()?);
    cell.get()
        .ok_or_else(|| io::Error::other("managed runtime unavailable"))
}

/// Runs `task` on the current tokio runtime, or on the managed one when there is none.
async fn execute_with_runtime_async<F, Fut, T>(
    managed: &OnceLock<Runtime>,
    task: F,
) -> Result<(T, Handle)>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        Ok((task().await, handle))
    } else {
        let runtime = managed_runtime(managed)?;
        Ok(runtime
            .spawn(async {
                let handle = Handle::current();
                let result = task().await;
                (result, handle)
            })
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use simplehttp_interface::{Error as TransportError, Transport as _};

    use super::*;

    #[test]
    fn managed_runtime_runs_outside_tokio() {
        let cell = OnceLock::new();
        let (value, handle) =
            futures::executor::block_on(execute_with_runtime_async(&cell, || async { 7 }))
                .unwrap();
        assert_eq!(value, 7);
        assert!(cell.get().is_some());
        drop(handle);
    }

    #[tokio::test]
    async fn current_runtime_is_preferred() {
        let cell = OnceLock::new();
        let (value, _) = execute_with_runtime_async(&cell, || async { "here" })
            .await
            .unwrap();
        assert_eq!(value, "here");
        assert!(cell.get().is_none());
    }

    #[tokio::test]
    async fn unsupported_tls_option_fails_before_connecting() {
        let mut req = Request::new(Method::Get, "https://127.0.0.1:9/");
        req.settings.tls.ciphers = Some("ECDHE".into());
        let err = ReqwestTransport::new().send(req).await.unwrap_err();
        assert!(matches!(err, TransportError::Unsupported(_)));
    }

    #[tokio::test]
    async fn relative_url_is_rejected() {
        let err = ReqwestTransport::new()
            .send(Request::new(Method::Get, "/relative"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[test]
    fn redirect_target_resolves_location() {
        let current = Url::parse("https://example.com/a/b?x=1").unwrap();
        let response = reqwest::Response::from(
            http::Response::builder()
                .status(302)
                .header("location", "../c")
                .body("")
                .unwrap(),
        );
        assert_eq!(
            redirect_target(&current, &response).unwrap().as_str(),
            "https://example.com/c"
        );
        let ok = reqwest::Response::from(http::Response::new(""));
        assert!(redirect_target(&current, &ok).is_none());
    }
}
