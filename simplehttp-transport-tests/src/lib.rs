#![cfg(test)]

//! End-to-end tests of the request builder over the reqwest transport.
//!
//! Every test registers handlers on one shared local HTTP/1.1 server, keyed by request path.

use std::{
    collections::HashMap,
    convert::Infallible,
    future::Future,
    io,
    net::SocketAddr,
    sync::{Arc, LazyLock, Mutex},
};

use futures::future::BoxFuture;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::{
    body::{self, Bytes},
    server::conn::http1,
    service::service_fn,
    Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use simplehttp::RequestBuilder;
use simplehttp_transport_reqwest::ReqwestTransport;
use tokio::net::TcpListener;

mod fixtures;
mod request_ext;

pub use request_ext::RequestExt;

type BoxedBody = BoxBody<Bytes, hyper::Error>;

/// A fixture's answer plus the request it rejected, if it did not look as expected.
type FixtureReply = (FixtureResponse, Result<(), Request<body::Incoming>>);

/// A response with either a buffered or a streamed body.
struct FixtureResponse(Response<BoxedBody>);

impl From<Response<Full<Bytes>>> for FixtureResponse {
    fn from(resp: Response<Full<Bytes>>) -> Self {
        Self(resp.map(|body| body.map_err(|never| match never {}).boxed()))
    }
}

impl From<Response<BoxedBody>> for FixtureResponse {
    fn from(resp: Response<BoxedBody>) -> Self {
        Self(resp)
    }
}

type Handler = Arc<dyn Fn(Request<body::Incoming>) -> BoxFuture<'static, FixtureReply> + Send + Sync>;

#[derive(Default)]
struct Routes {
    handlers: HashMap<String, Handler>,
    rejected: HashMap<String, String>,
}

static ROUTES: LazyLock<Mutex<Routes>> = LazyLock::new(Default::default);

/// Unregisters its path on drop and fails the test if the handler rejected a request.
#[must_use]
struct HyperFixtureHandle(String);

impl Drop for HyperFixtureHandle {
    fn drop(&mut self) {
        let rejected = {
            let mut routes = ROUTES.lock().unwrap();
            routes.handlers.remove(&self.0);
            routes.rejected.remove(&self.0)
        };
        if let Some(req) = rejected {
            if !std::thread::panicking() {
                panic!("fixture {} rejected {req}", self.0);
            }
        }
    }
}

/// Serves `handler` at `path` until the returned handle is dropped.
fn add_hyper_fixture<Fut, Resp>(
    path: impl Into<String>,
    handler: impl Fn(Request<body::Incoming>) -> Fut + Send + Sync + 'static,
) -> HyperFixtureHandle
where
    Fut: Future<Output = (Resp, Result<(), Request<body::Incoming>>)> + Send + 'static,
    Resp: Into<FixtureResponse>,
{
    let path = match path.into() {
        p if p.starts_with('/') => p,
        p => format!("/{p}"),
    };
    let handler: Handler = Arc::new(move |req| {
        let fut = handler(req);
        Box::pin(async move {
            let (resp, verdict) = fut.await;
            (resp.into(), verdict)
        })
    });
    ROUTES
        .lock()
        .unwrap()
        .handlers
        .insert(path.clone(), handler);
    HyperFixtureHandle(path)
}

async fn route(req: Request<body::Incoming>) -> Result<Response<BoxedBody>, Infallible> {
    let path = req.uri().path().to_owned();
    let handler = ROUTES.lock().unwrap().handlers.get(&path).cloned();
    let Some(handler) = handler else {
        let mut res = Response::new(Full::new(Bytes::from_static(b"no fixture")));
        *res.status_mut() = StatusCode::NOT_FOUND;
        return Ok(FixtureResponse::from(res).0);
    };

    let (response, verdict) = handler(req).await;
    if let Err(req) = verdict {
        let summary = format!("{} {} {:?}", req.method(), req.uri(), req.headers());
        ROUTES.lock().unwrap().rejected.insert(path, summary);
    }
    Ok(response.0)
}

async fn start_server() -> io::Result<String> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let port = listener.local_addr()?.port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service_fn(route));
                if let Err(err) = conn.await {
                    eprintln!("fixture connection failed: {err:?}");
                }
            });
        }
    });

    Ok(format!("http://127.0.0.1:{port}/"))
}

/// Hosts the fixture server. Tests block on it as well.
static RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
});

/// The root URL of the fixture server, started on first use.
async fn server_url() -> io::Result<String> {
    static SERVER: tokio::sync::OnceCell<String> = tokio::sync::OnceCell::const_new();
    SERVER.get_or_try_init(start_server).await.cloned()
}

/// A builder root over the reqwest transport with the fixture server as base URI.
async fn init_builder() -> io::Result<RequestBuilder> {
    let url = server_url().await?;
    Ok(simplehttp::create(ReqwestTransport::new()).set_base_uri(&url))
}

/// [`init_builder`] for tests that drive requests without a tokio runtime.
fn init_builder_outside_runtime() -> io::Result<RequestBuilder> {
    RUNTIME.block_on(init_builder())
}
