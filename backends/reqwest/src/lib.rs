//! A [`simplehttp`](https://docs.rs/simplehttp) transport built on reqwest.
//!
//! ```no_run
//! # async fn run() -> simplehttp::Result<()> {
//! let mut res = simplehttp::create(simplehttp_transport_reqwest::ReqwestTransport::new())
//!     .url("https://example.com")
//!     .request()?;
//! println!("{}", res.content().await?);
//! # Ok(())
//! # }
//! ```
//!
//! Redirects are followed by the transport itself, up to `max_redirects` (20 by default).
//! `301` and `302` turn a `POST` into a `GET`, `303` turns anything but `HEAD` into a `GET`, and
//! `Authorization` is dropped when the host changes. TLS knobs reqwest cannot express, such as
//! `capath`, `ciphers`, `peer_fingerprint`, `passphrase` and `capture_peer_cert_chain`, fail
//! with [`simplehttp_interface::Error::Unsupported`].

#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;
mod error;
mod request;
mod response;
mod transport;

pub use transport::{ReqwestTransport, DEFAULT_MAX_REDIRECTS};
