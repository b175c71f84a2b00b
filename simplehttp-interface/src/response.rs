//! Concrete response messages produced by a transport.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime};

use bytes::{Bytes, BytesMut};
use futures_core::stream::{BoxStream, Stream};
use futures_util::stream::{self, StreamExt};

use crate::request::{HttpVersion, Method};

/// Metadata about a finished or in-flight transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInfo {
    /// The URL the response was finally received from.
    pub url: String,
    /// The method of the last request in the redirect chain.
    pub http_method: Method,
    /// Number of redirects followed.
    pub redirect_count: u32,
    /// The redirect target that was not followed, if the response is itself a redirect.
    pub redirect_url: Option<String>,
    /// When the transfer started.
    pub start_time: SystemTime,
    /// Time until the response head was available.
    pub total_time: Duration,
    /// The remote IP address, if the transport knows it.
    pub primary_ip: Option<String>,
}

impl TransferInfo {
    /// Creates info for a transfer that started now and was not redirected.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_method: method,
            redirect_count: 0,
            redirect_url: None,
            start_time: SystemTime::now(),
            total_time: Duration::ZERO,
            primary_ip: None,
        }
    }
}

/// A streamed response body.
pub struct ResponseBody {
    stream: BoxStream<'static, io::Result<Bytes>>,
    content_length: Option<u64>,
}

impl ResponseBody {
    /// Wraps a stream of chunks.
    pub fn from_stream<S>(stream: S, content_length: Option<u64>) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
            content_length,
        }
    }

    /// A body that is already fully in memory.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        let chunks = if bytes.is_empty() { None } else { Some(Ok(bytes)) };
        Self::from_stream(stream::iter(chunks), Some(len))
    }

    /// An empty body.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// The body length, if known before reading.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Calls `f` with every chunk as it passes through, without altering it.
    pub fn inspect(self, mut f: impl FnMut(&Bytes) + Send + 'static) -> Self {
        Self {
            stream: Box::pin(self.stream.map(move |chunk| {
                if let Ok(chunk) = &chunk {
                    f(chunk);
                }
                chunk
            })),
            content_length: self.content_length,
        }
    }

    /// Reads the remaining body into memory.
    pub async fn collect(mut self) -> io::Result<Bytes> {
        let mut buf = BytesMut::with_capacity(
            self.content_length
                .and_then(|len| usize::try_from(len).ok())
                .unwrap_or(0)
                .min(1 << 20),
        );
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl Stream for ResponseBody {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// A response as produced by a transport, with its body not yet read.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The reason phrase, if any.
    pub reason: Option<String>,
    /// Response headers in the order received.
    pub headers: Vec<(String, String)>,
    /// The negotiated protocol version.
    pub version: HttpVersion,
    /// The response body.
    pub body: ResponseBody,
    /// Transfer metadata.
    pub info: TransferInfo,
}

impl Response {
    /// Creates a response with an in-memory body and no headers.
    pub fn new(status: u16, body: impl Into<Bytes>, info: TransferInfo) -> Self {
        Self {
            status,
            reason: None,
            headers: vec![],
            version: HttpVersion::default(),
            body: ResponseBody::from_bytes(body),
            info,
        }
    }

    /// Gets the last value of a header, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::find_header(&self.headers, name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::executor::block_on;

    use super::*;

    #[test]
    fn collect_concatenates_chunks() {
        let body = ResponseBody::from_stream(
            stream::iter(vec![Ok(Bytes::from("foo ")), Ok(Bytes::from("bar"))]),
            None,
        );
        assert_eq!(block_on(body.collect()).unwrap(), Bytes::from("foo bar"));
    }

    #[test]
    fn collect_propagates_errors() {
        let body = ResponseBody::from_stream(
            stream::iter(vec![
                Ok(Bytes::from("foo")),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            ]),
            None,
        );
        let err = block_on(body.collect()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn inspect_sees_every_chunk() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let body = ResponseBody::from_stream(
            stream::iter(vec![Ok(Bytes::from("ab")), Ok(Bytes::from("cde"))]),
            Some(5),
        )
        .inspect(move |chunk| {
            counter.fetch_add(chunk.len(), Ordering::SeqCst);
        });
        assert_eq!(body.content_length(), Some(5));
        assert_eq!(block_on(body.collect()).unwrap(), Bytes::from("abcde"));
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn empty_body_has_zero_length() {
        let body = ResponseBody::empty();
        assert_eq!(body.content_length(), Some(0));
        assert!(block_on(body.collect()).unwrap().is_empty());
    }
}
