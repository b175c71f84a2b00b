//! The transport traits.
//!
//! Transport developers implement [`Transport`]. The object-safe [`AnyTransport`] is
//! implemented automatically and is what the request builder stores.

mod any;
mod backend;

pub use any::AnyTransport;
pub use backend::Transport;
