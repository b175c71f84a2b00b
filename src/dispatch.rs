//! Sends a built request through the plugin chain and settles the response body.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::future::BoxFuture;
use fs2::FileExt;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use simplehttp_interface::{AnyTransport, HttpVersion, Request, ResponseBody, TransferInfo};

use crate::options::Sink;
use crate::plugin::{Next, Plugin};
use crate::progress::{Progress, ProgressCallback, ProgressInfo};
use crate::Result;

/// Where the body of a settled response ended up.
#[derive(Debug, Clone)]
pub(crate) enum Content {
    Memory(Bytes),
    File(PathBuf),
    Detached,
}

/// A response whose transfer has completed.
#[derive(Debug)]
pub(crate) struct Settled {
    pub(crate) status: u16,
    pub(crate) reason: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) version: HttpVersion,
    pub(crate) info: TransferInfo,
    pub(crate) content: Content,
}

pub(crate) struct Dispatch {
    pub(crate) transport: Arc<dyn AnyTransport>,
    pub(crate) plugins: Vec<Plugin>,
    pub(crate) on_progress: Option<ProgressCallback>,
    pub(crate) sink: Option<Sink>,
}

impl Dispatch {
    /// Runs the transfer. Nothing is sent until the returned future is polled.
    pub(crate) fn send(self, req: Request) -> BoxFuture<'static, Result<Settled>> {
        Box::pin(async move {
            let Dispatch {
                transport,
                plugins,
                on_progress,
                sink,
            } = self;
            let started = Instant::now();
            debug!(method = %req.method, uri = %req.uri, transport = ?transport, "dispatching request");

            let res = Next::new(&plugins, &*transport).run(req).await?;
            trace!(status = res.status, "response head received");

            let mut body = res.body;
            if let Some(callback) = on_progress {
                body = report_progress(body, callback, &res.info, started);
            }

            let content = match sink {
                None => Content::Memory(body.collect().await?),
                Some(Sink::File(path)) => {
                    let file = open_locked(path.clone(), false).await?;
                    drain(body, file).await?;
                    Content::File(path)
                }
                Some(Sink::AppendFile(path)) => {
                    let file = open_locked(path.clone(), true).await?;
                    drain(body, file).await?;
                    Content::File(path)
                }
                Some(Sink::Writer(writer)) => {
                    let mut guard = writer.0.lock().await;
                    drain(body, &mut *guard).await?;
                    Content::Detached
                }
            };

            let mut info = res.info;
            info.total_time = started.elapsed();
            Ok(Settled {
                status: res.status,
                reason: res.reason,
                headers: res.headers,
                version: res.version,
                info,
                content,
            })
        })
    }
}

/// Opens `path` for writing once no other sink holds it.
///
/// The lock lives as long as the returned file. Truncation happens only after it is taken.
async fn open_locked(path: PathBuf, append: bool) -> Result<File> {
    let file = tokio::task::spawn_blocking(move || -> io::Result<std::fs::File> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .append(append)
            .create(true)
            .open(&path)?;
        trace!(path = %path.display(), "waiting for sink lock");
        FileExt::lock_exclusive(&file)?;
        if !append {
            file.set_len(0)?;
        }
        Ok(file)
    })
    .await
    .map_err(io::Error::other)??;
    Ok(File::from_std(file))
}

/// Copies the body into `out`. `out` is dropped on every path once this returns.
async fn drain<W>(mut body: ResponseBody, mut out: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(chunk) = body.next().await {
        out.write_all(&chunk?).await?;
    }
    out.flush().await?;
    Ok(())
}

/// Ticks once for the response head, then once per body chunk.
fn report_progress(
    body: ResponseBody,
    callback: ProgressCallback,
    info: &TransferInfo,
    started: Instant,
) -> ResponseBody {
    let total = body.content_length();
    let info = ProgressInfo {
        url: info.url.clone(),
        http_method: info.http_method,
        elapsed: started.elapsed(),
    };
    let mut progress = Progress {
        downloaded: 0,
        total,
        info,
    };
    callback.call(&progress);
    body.inspect(move |chunk| {
        progress.downloaded += chunk.len() as u64;
        progress.info.elapsed = started.elapsed();
        callback.call(&progress);
    })
}
