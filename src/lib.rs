//! An immutable, fluent HTTP request builder over pluggable transports.
//!
//! ## Overview
//!
//! `simplehttp` lets you assemble a request one chained call at a time. Every call returns a
//! new [`RequestBuilder`] and leaves the one it was called on untouched, so a partially
//! configured builder can be shared and specialized freely:
//!
//! ```no_run
//! # async fn run(transport: simplehttp::mock::MockTransport) -> simplehttp::Result<()> {
//! let api = simplehttp::create(transport)
//!     .set_base_uri("https://api.example.com/v1/")
//!     .bearer_token("secret");
//!
//! let mut users = api.url("users").query([("page", "2")]).request()?;
//! println!("{}", users.status_code().await?);
//!
//! let created = api
//!     .url("users")
//!     .post()
//!     .json(serde_json::json!({ "name": "Ada" }))
//!     .request()?
//!     .with_successful_status()
//!     .await?;
//! # drop(created);
//! # Ok(())
//! # }
//! ```
//!
//! ## Transports
//!
//! The crate does not speak HTTP itself. A builder root is created with an explicit
//! [`Transport`] implementation, such as the one in `simplehttp-transport-reqwest`, or through
//! `simplehttp_preset::create()`, which wires up the default transport. [`mock::MockTransport`]
//! answers from a queue for tests.
//!
//! ## Plugins
//!
//! Authentication, query defaults, base URI resolution, response caching and persisting
//! response bodies to a [`storage::Storage`] are implemented as [`plugin::Plugin`]s that wrap
//! the transport in registration order.
//!
//! ## Responses
//!
//! [`RequestBuilder::request`] returns a [`Response`] right away. The transfer runs the first
//! time one of its async accessors is awaited and the outcome is kept, so later accessors do
//! not send the request again.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod body;
mod builder;
mod compose;
mod dispatch;
mod error;
mod options;
mod progress;
mod response;
mod status;

pub mod cache;
pub mod header;
pub mod mock;
pub mod plugin;
pub mod storage;

pub use builder::{create, RequestBuilder};
pub use error::{Error, Result};
pub use options::{Auth, FilePart, RequestBody, RequestOptions, Sink, SinkWriter, UserData};
pub use progress::{Progress, ProgressCallback, ProgressInfo};
pub use response::Response;
pub use simplehttp_interface::{
    self as interface, HttpVersion, Method, Request, TlsOptions, TransferInfo, TransferSettings,
    Transport,
};
pub use status::{StatusClass, StatusCode};
