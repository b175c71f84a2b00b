//! The Build Step: turns an option record into a concrete transport request.

use std::sync::Arc;

use tracing::debug;

use simplehttp_interface::{remove_header, upsert_header, Method, Request};

use crate::body::{encode_form, encode_multipart, generate_multipart_boundary, json_fields};
use crate::header;
use crate::options::{RequestBody, RequestOptions};
use crate::plugin::merge_query;
use crate::{Error, Result};

/// Materializes `options` into a request.
///
/// Header order follows insertion order. Authentication and base URI resolution are left to
/// the plugin chain.
pub(crate) fn build_request(options: &RequestOptions) -> Result<Request> {
    let url = options.url.as_deref().ok_or(Error::MissingUrl)?;
    let mut headers = options.headers.clone();

    let body = if options.files.is_empty() {
        match &options.body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Text(text) => text.clone().into_bytes(),
            RequestBody::Form(fields) => encode_form(fields).into_bytes(),
            RequestBody::Json(json) => {
                serde_json::to_vec(json).map_err(|e| Error::JsonEncode(Arc::new(e)))?
            }
        }
    } else {
        let fields = match &options.body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Text(text) if text.is_empty() => Vec::new(),
            RequestBody::Text(_) => {
                return Err(Error::invalid_argument(
                    "file uploads require form fields or a JSON object as the body, not a raw string",
                ))
            }
            RequestBody::Form(fields) => fields.clone(),
            RequestBody::Json(json) => json_fields(json),
        };
        let boundary = generate_multipart_boundary();
        let body = encode_multipart(&boundary, &fields, &options.files);
        remove_header(&mut headers, header::CONTENT_TYPE);
        upsert_header(
            &mut headers,
            header::CONTENT_TYPE.to_string(),
            format!("multipart/form-data; boundary={boundary}"),
        );
        upsert_header(
            &mut headers,
            header::CONTENT_LENGTH.to_string(),
            body.len().to_string(),
        );
        body
    };

    let mut method = options.method;
    if !body.is_empty() && matches!(method, Method::Get | Method::Head) {
        debug!(from = %method, "request has a body, sending it as POST");
        method = Method::Post;
    }

    Ok(Request {
        method,
        uri: merge_query(url, &options.query),
        headers,
        body: body.into(),
        version: options.http_version,
        settings: options.transfer_settings(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::options::FilePart;

    fn options(url: &str) -> RequestOptions {
        RequestOptions {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_url() {
        let err = build_request(&RequestOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingUrl));
    }

    #[test]
    fn body_upgrades_get_to_post() {
        let mut opts = options("https://example.com");
        opts.body("x=1");
        let req = build_request(&opts).unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(&req.body[..], b"x=1");
    }

    #[test]
    fn empty_body_keeps_method() {
        let mut opts = options("https://example.com");
        opts.method = Method::Head;
        opts.body("");
        assert_eq!(build_request(&opts).unwrap().method, Method::Head);
    }

    #[test]
    fn put_with_body_is_kept() {
        let mut opts = options("https://example.com");
        opts.method = Method::Put;
        opts.json(json!({"foo": "bar"}));
        let req = build_request(&opts).unwrap();
        assert_eq!(req.method, Method::Put);
        assert_eq!(&req.body[..], br#"{"foo":"bar"}"#);
    }

    #[test]
    fn query_defaults_do_not_override_url() {
        let mut opts = options("https://example.com/a?page=2");
        opts.query([("page", "1"), ("size", "10")]);
        let req = build_request(&opts).unwrap();
        assert_eq!(req.uri, "https://example.com/a?page=2&size=10");
    }

    #[test]
    fn files_switch_to_multipart() {
        let mut opts = options("https://example.com/upload");
        opts.body([("title", "doc")])
            .add_file("doc", FilePart::new("hello", "text/plain"));
        let req = build_request(&opts).unwrap();
        let content_type = req.header("content-type").unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert_eq!(
            req.header("content-length"),
            Some(req.body.len().to_string().as_str())
        );
        let text = String::from_utf8(req.body.to_vec()).unwrap();
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("name=\"title\"\r\n\r\ndoc\r\n"));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
        assert_eq!(
            req.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
    }

    #[test]
    fn files_with_raw_body_are_rejected() {
        let mut opts = options("https://example.com/upload");
        opts.body("raw").add_file("doc", FilePart::new("x", "text/plain"));
        assert!(matches!(
            build_request(&opts).unwrap_err(),
            Error::InvalidArgument(_)
        ));
    }

    #[test]
    fn settings_are_copied() {
        let mut opts = options("https://example.com");
        opts.max_redirects = Some(3);
        opts.verify_peer(false);
        let req = build_request(&opts).unwrap();
        assert_eq!(req.settings.max_redirects, Some(3));
        assert!(!req.settings.tls.verify_peer);
    }
}
