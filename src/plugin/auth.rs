use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::BoxFuture;
use tracing::trace;

use simplehttp_interface::{Request, Response};

use super::Next;
use crate::header::AUTHORIZATION;
use crate::options::Auth;
use crate::Result;

/// Sets the `Authorization` header on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Authentication {
    auth: Auth,
}

impl Authentication {
    /// Creates the plugin.
    pub fn new(auth: Auth) -> Self {
        Self { auth }
    }

    /// The credentials this plugin sends.
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// The `Authorization` header value.
    pub fn header_value(&self) -> String {
        match &self.auth {
            Auth::Basic { username, password } => {
                let credentials = format!("{username}:{}", password.as_deref().unwrap_or_default());
                format!("Basic {}", STANDARD.encode(credentials))
            }
            Auth::Bearer(token) => format!("Bearer {token}"),
        }
    }

    pub(super) fn handle<'a>(&'a self, mut req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        let scheme = match self.auth {
            Auth::Basic { .. } => "basic",
            Auth::Bearer(_) => "bearer",
        };
        trace!(scheme, "adding authorization header");
        req.set_header(AUTHORIZATION, self.header_value());
        next.run(req)
    }
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authentication").finish_non_exhaustive()
    }
}
