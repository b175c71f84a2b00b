use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use http::response::Parts;
use http_body::Body as _;
use simplehttp_interface::{HttpVersion, Response, ResponseBody, TransferInfo};
use tokio::runtime::Handle;

/// A reqwest body polled with its runtime entered, so it can be read from any executor.
struct RuntimeBody {
    body: Pin<Box<reqwest::Body>>,
    handle: Handle,
}

impl Stream for RuntimeBody {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let _enter = this.handle.enter();
        loop {
            let frame = ready!(this.body.as_mut().poll_frame(cx));
            return Poll::Ready(match frame {
                None => None,
                Some(Err(e)) => Some(Err(io::Error::other(e))),
                Some(Ok(frame)) => match frame.into_data() {
                    Ok(data) if !data.is_empty() => Some(Ok(data)),
                    // Trailers and empty frames carry no body bytes.
                    _ => continue,
                },
            });
        }
    }
}

fn convert_version(version: http::Version) -> HttpVersion {
    if version >= http::Version::HTTP_2 {
        HttpVersion::Http2
    } else {
        HttpVersion::Http11
    }
}

fn convert_headers(parts: &Parts) -> Vec<(String, String)> {
    parts
        .headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Converts a reqwest response whose head has arrived.
pub fn convert_response(
    response: reqwest::Response,
    handle: Handle,
    mut info: TransferInfo,
) -> Response {
    info.primary_ip = response.remote_addr().map(|addr| addr.ip().to_string());
    let http_response: http::Response<reqwest::Body> = response.into();
    let (parts, body) = http_response.into_parts();
    let content_length = body.size_hint().exact();
    let body = ResponseBody::from_stream(
        RuntimeBody {
            body: Box::pin(body),
            handle,
        },
        content_length,
    );

    Response {
        status: parts.status.as_u16(),
        reason: parts.status.canonical_reason().map(String::from),
        headers: convert_headers(&parts),
        version: convert_version(parts.version),
        body,
        info,
    }
}
