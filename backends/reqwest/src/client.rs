use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::{Certificate, Client, Identity};
use simplehttp_interface::{HttpVersion, Request, TlsOptions};
use tracing::debug;

use crate::error::{ReqwestTransportError, Result};

/// The settings that can only be applied when a reqwest client is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey {
    tls: TlsOptions,
    idle_timeout: Option<Duration>,
    proxy: Option<String>,
    no_proxy: Option<String>,
    bind_to: Option<IpAddr>,
    resolve: Vec<(String, IpAddr)>,
    version: HttpVersion,
    prior_knowledge: bool,
}

impl ClientKey {
    pub fn for_request(req: &Request, cleartext: bool) -> Self {
        let settings = &req.settings;
        Self {
            tls: settings.tls.clone(),
            idle_timeout: settings.timeout,
            proxy: settings.proxy.clone(),
            no_proxy: settings.no_proxy.clone(),
            bind_to: settings.bind_to,
            resolve: settings.resolve.clone(),
            version: req.version,
            prior_knowledge: cleartext && req.version == HttpVersion::Http2,
        }
    }
}

/// Reqwest clients keyed by their build-time settings, so connections are reused by
/// requests that agree on them.
#[derive(Default)]
pub struct ClientCache {
    clients: Mutex<HashMap<ClientKey, Client>>,
}

impl ClientCache {
    pub fn get_or_build(&self, key: ClientKey) -> Result<Client> {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }
        let client = build_reqwest_client(&key)?;
        debug!(?key, "created reqwest client");
        clients.insert(key, client.clone());
        Ok(client)
    }
}

fn check_supported(tls: &TlsOptions) -> Result<()> {
    if tls.capath.is_some() {
        return Err(ReqwestTransportError::Unsupported("capath"));
    }
    if tls.ciphers.is_some() {
        return Err(ReqwestTransportError::Unsupported("ciphers"));
    }
    if tls.peer_fingerprint.is_some() {
        return Err(ReqwestTransportError::Unsupported("peer_fingerprint"));
    }
    if tls.passphrase.is_some() {
        return Err(ReqwestTransportError::Unsupported("passphrase"));
    }
    if tls.capture_peer_cert_chain {
        return Err(ReqwestTransportError::Unsupported("capture_peer_cert_chain"));
    }
    if tls.verify_peer && !tls.verify_host {
        return Err(ReqwestTransportError::Unsupported(
            "verify_host disabled while verify_peer is enabled",
        ));
    }
    Ok(())
}

fn read_pem(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        ReqwestTransportError::Tls(format!("cannot read {}: {e}", path.display()))
    })
}

pub fn build_reqwest_client(key: &ClientKey) -> Result<Client> {
    check_supported(&key.tls)?;

    let mut builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .danger_accept_invalid_certs(!key.tls.verify_peer);

    if let Some(cafile) = &key.tls.cafile {
        let pem = read_pem(cafile)?;
        let certs = Certificate::from_pem_bundle(&pem)
            .map_err(|e| ReqwestTransportError::Tls(e.to_string()))?;
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }
    match (&key.tls.local_cert, &key.tls.local_pk) {
        (Some(cert), pk) => {
            let mut pem = read_pem(cert)?;
            if let Some(pk) = pk {
                pem.push(b'\n');
                pem.extend(read_pem(pk)?);
            }
            let identity =
                Identity::from_pem(&pem).map_err(|e| ReqwestTransportError::Tls(e.to_string()))?;
            builder = builder.identity(identity);
        }
        (None, Some(_)) => {
            return Err(ReqwestTransportError::Tls(
                "local_pk requires local_cert".into(),
            ))
        }
        (None, None) => {}
    }

    if let Some(timeout) = key.idle_timeout {
        builder = builder.connect_timeout(timeout).read_timeout(timeout);
    }
    if let Some(proxy) = &key.proxy {
        let mut proxy = reqwest::Proxy::all(proxy.as_str())?;
        if let Some(no_proxy) = &key.no_proxy {
            proxy = proxy.no_proxy(reqwest::NoProxy::from_string(no_proxy));
        }
        builder = builder.proxy(proxy);
    }
    if let Some(addr) = key.bind_to {
        builder = builder.local_address(addr);
    }
    for (host, addr) in &key.resolve {
        // The port of an override is ignored; the URL's port is used.
        builder = builder.resolve(host, SocketAddr::new(*addr, 0));
    }
    builder = match key.version {
        HttpVersion::Http11 => builder.http1_only(),
        HttpVersion::Http2 if key.prior_knowledge => builder.http2_prior_knowledge(),
        HttpVersion::Http2 => builder,
    };

    Ok(builder.build()?)
}
