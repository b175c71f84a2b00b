//! An in-memory transport for tests.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::stream;

use simplehttp_interface::{Error as TransportError, Request, Response, ResponseBody, Transport, TransferInfo};

enum Reply {
    Ready(Response),
    Failed(TransportError),
    Hang,
}

#[derive(Default)]
struct Inner {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Request>>,
}

/// A transport that answers with queued responses and records every request it receives.
///
/// Clones share the same queue and log, so a test can keep one handle while the builder owns
/// another. An empty queue answers with a network error.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    /// Creates a transport with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn enqueue(&self, reply: Reply) {
        self.inner
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Queues a response. Its URL and method are replaced with those of the request.
    pub fn push(&self, response: Response) {
        self.enqueue(Reply::Ready(response));
    }

    /// Queues a response with a fully buffered body.
    pub fn push_text(&self, status: u16, body: impl Into<Bytes>) {
        self.push(Response::new(status, body, TransferInfo::new(Default::default(), "")));
    }

    /// Queues a response whose body arrives in the given chunks.
    pub fn push_chunks<I, B>(&self, status: u16, chunks: I)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks: Vec<io::Result<Bytes>> = chunks.into_iter().map(|c| Ok(c.into())).collect();
        let len = chunks
            .iter()
            .map(|c| c.as_ref().map_or(0, |b| b.len() as u64))
            .sum();
        let mut response = Response::new(status, Bytes::new(), TransferInfo::new(Default::default(), ""));
        response.body = ResponseBody::from_stream(stream::iter(chunks), Some(len));
        self.push(response);
    }

    /// Queues a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.enqueue(Reply::Failed(error));
    }

    /// Queues a reply that never completes.
    pub fn push_pending(&self) {
        self.enqueue(Reply::Hang);
    }

    /// The requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Transport for MockTransport {
    fn describe(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MockTransport")
    }

    async fn send(&self, req: Request) -> simplehttp_interface::Result<Response> {
        let (method, uri) = (req.method, req.uri.clone());
        self.inner
            .requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(req);
        let reply = self
            .inner
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match reply {
            Some(Reply::Ready(mut response)) => {
                response.info.url = uri;
                response.info.http_method = method;
                Ok(response)
            }
            Some(Reply::Failed(e)) => Err(e),
            Some(Reply::Hang) => futures::future::pending().await,
            None => Err(TransportError::Network(Box::new(io::Error::other(
                "no response queued",
            )))),
        }
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport").finish_non_exhaustive()
    }
}
