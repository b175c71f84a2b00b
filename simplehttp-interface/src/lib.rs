//! Transport contract for simplehttp request builders.
//!
//! This crate provides the interface that transports must implement to be driven by the
//! `simplehttp` request builder. It defines the concrete request and response messages
//! exchanged with a transport, the per-request transfer settings, and the [`Transport`]
//! trait itself.
//!
//! ## Transports
//!
//! A transport receives a fully built [`Request`] and resolves it into a [`Response`] whose
//! body is streamed. Connection handling, TLS, proxies and network I/O are entirely the
//! transport's business; the builder only hands over the [`TransferSettings`] the caller
//! asked for. A transport that cannot honor a setting should fail with
//! [`Error::Unsupported`] instead of silently ignoring it.
//!
//! Transports are injected explicitly when the builder root is created. There is no global
//! registration or runtime discovery.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod error;
mod request;
mod response;
mod settings;
pub mod transport;

pub use error::{Error, Result};
pub use request::{HttpVersion, Method, ParseHttpVersionError, ParseMethodError, Request};
pub use response::{Response, ResponseBody, TransferInfo};
pub use settings::{TlsOptions, TransferSettings};
pub use transport::{AnyTransport, Transport};

/// Looks up a header value by name, ignoring ASCII case.
///
/// Returns the last matching value so that later entries win.
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Inserts or replaces a header, matching existing names without regard to ASCII case.
///
/// The replaced entry keeps its position but takes the newly supplied spelling of the name.
pub fn upsert_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    let mut existing = headers
        .iter()
        .enumerate()
        .filter(|(_, (k, _))| k.eq_ignore_ascii_case(&name))
        .map(|(idx, _)| idx);
    match existing.next() {
        Some(first) => {
            let duplicates: Vec<usize> = existing.collect();
            for idx in duplicates.into_iter().rev() {
                headers.remove(idx);
            }
            headers[first] = (name, value);
        }
        None => headers.push((name, value)),
    }
}

/// Removes every header with the given name, ignoring ASCII case.
pub fn remove_header(headers: &mut Vec<(String, String)>, name: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_case_insensitively() {
        let mut headers = vec![
            ("Accept".to_string(), "text/plain".to_string()),
            ("X-Token".to_string(), "abc".to_string()),
        ];
        upsert_header(&mut headers, "accept".into(), "application/json".into());
        assert_eq!(
            headers,
            vec![
                ("accept".to_string(), "application/json".to_string()),
                ("X-Token".to_string(), "abc".to_string()),
            ]
        );
        assert_eq!(find_header(&headers, "ACCEPT"), Some("application/json"));
    }

    #[test]
    fn upsert_collapses_duplicates() {
        let mut headers = vec![
            ("Accept".to_string(), "a".to_string()),
            ("ACCEPT".to_string(), "b".to_string()),
        ];
        upsert_header(&mut headers, "Accept".into(), "c".into());
        assert_eq!(headers, vec![("Accept".to_string(), "c".to_string())]);
    }

    #[test]
    fn remove_header_drops_all_spellings() {
        let mut headers = vec![
            ("Content-Type".to_string(), "a".to_string()),
            ("content-type".to_string(), "b".to_string()),
            ("Accept".to_string(), "c".to_string()),
        ];
        remove_header(&mut headers, "CONTENT-TYPE");
        assert_eq!(headers, vec![("Accept".to_string(), "c".to_string())]);
    }
}
