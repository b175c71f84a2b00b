use bytes::Bytes;
use http::{HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use simplehttp_interface::Method;
use url::Url;

use crate::error::{ReqwestTransportError, Result};

pub fn convert_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Trace => reqwest::Method::TRACE,
        Method::Connect => reqwest::Method::CONNECT,
    }
}

pub fn parse_url(uri: &str) -> Result<Url> {
    Url::parse(uri).map_err(|e| ReqwestTransportError::InvalidUrl(format!("{uri}: {e}")))
}

fn convert_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ReqwestTransportError::InvalidHeaderName(name.into()))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| ReqwestTransportError::InvalidHeaderValue(name.as_str().into()))?;
    Ok((name, value))
}

/// Builds one hop of a possibly redirected transfer.
pub fn build_hop(
    client: &Client,
    method: Method,
    url: Url,
    headers: &[(String, String)],
    body: &Bytes,
) -> Result<RequestBuilder> {
    let mut builder = client.request(convert_method(method), url);
    for (name, value) in headers {
        let (name, value) = convert_header(name, value)?;
        builder = builder.header(name, value);
    }
    if !body.is_empty() {
        builder = builder.body(body.clone());
    }
    Ok(builder)
}
