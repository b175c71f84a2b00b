//! Builder roots wired to the default transport.
//!
//! ```no_run
//! # async fn run() -> simplehttp::Result<()> {
//! let mut res = simplehttp_preset::create()
//!     .url("https://example.com")
//!     .request()?;
//! println!("{}", res.status_code().await?);
//! # Ok(())
//! # }
//! ```

pub use simplehttp_transport_reqwest::ReqwestTransport as Transport;

/// Creates a builder root backed by a fresh [`Transport`].
pub fn create() -> simplehttp::RequestBuilder {
    simplehttp::create(Transport::new())
}

/// Creates a builder root backed by `transport`, sharing its connection pools.
pub fn create_with(transport: &Transport) -> simplehttp::RequestBuilder {
    simplehttp::create(transport.clone())
}
