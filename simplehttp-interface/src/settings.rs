//! Transfer settings passed verbatim to the transport.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// TLS verification and client certificate options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsOptions {
    /// Whether to verify the peer's certificate chain.
    pub verify_peer: bool,
    /// Whether to verify that the certificate matches the host name.
    pub verify_host: bool,
    /// A PEM file holding additional trusted certificate authorities.
    pub cafile: Option<PathBuf>,
    /// A directory of trusted certificate authorities.
    pub capath: Option<PathBuf>,
    /// A PEM client certificate.
    pub local_cert: Option<PathBuf>,
    /// The PEM private key for [`TlsOptions::local_cert`].
    pub local_pk: Option<PathBuf>,
    /// Passphrase protecting [`TlsOptions::local_pk`].
    pub passphrase: Option<String>,
    /// An OpenSSL-style cipher list.
    pub ciphers: Option<String>,
    /// Expected fingerprint of the peer certificate.
    pub peer_fingerprint: Option<String>,
    /// Whether to capture the peer certificate chain into the transfer info.
    pub capture_peer_cert_chain: bool,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            verify_peer: true,
            verify_host: true,
            cafile: None,
            capath: None,
            local_cert: None,
            local_pk: None,
            passphrase: None,
            ciphers: None,
            peer_fingerprint: None,
            capture_peer_cert_chain: false,
        }
    }
}

/// Per-request transport tuning knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// TLS options.
    pub tls: TlsOptions,
    /// Maximum time to wait while the transfer is idle.
    pub timeout: Option<Duration>,
    /// Maximum time the whole transfer, including redirects, may take.
    pub max_duration: Option<Duration>,
    /// Maximum number of redirects to follow. `Some(0)` disables redirects; `None` leaves
    /// the limit to the transport.
    pub max_redirects: Option<u32>,
    /// Proxy URL.
    pub proxy: Option<String>,
    /// Comma-separated hosts that bypass the proxy.
    pub no_proxy: Option<String>,
    /// Local address to bind the connection to.
    pub bind_to: Option<IpAddr>,
    /// Host name overrides, resolved before DNS.
    pub resolve: Vec<(String, IpAddr)>,
    /// Transport-specific extra options.
    pub extra: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_defaults_verify() {
        let tls = TlsOptions::default();
        assert!(tls.verify_peer);
        assert!(tls.verify_host);
        assert!(!tls.capture_peer_cert_chain);
    }

    #[test]
    fn settings_deserialize_partial() {
        let settings: TransferSettings =
            serde_json::from_str(r#"{"max_redirects": 3, "tls": {"verify_peer": false}}"#)
                .unwrap();
        assert_eq!(settings.max_redirects, Some(3));
        assert!(!settings.tls.verify_peer);
        assert!(settings.tls.verify_host);
        assert!(settings.resolve.is_empty());
    }
}
