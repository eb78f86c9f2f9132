//! Fixture service for end-to-end acceptance runs
//!
//! [`AuthServer`] answers `GET /authenticate` the way the real service does:
//! no `Authorization` header gets `401` with `WWW-Authenticate: Basic`, a
//! wrong pair gets a plain `401`, the valid pair gets `200`.

use base64::{engine::general_purpose, Engine as _};
use hyper::service::{make_service_fn, service_fn};
use hyper::{header, Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug)]
struct Accounts {
    username: String,
    password: String,
}

/// In-process HTTP service protected by Basic authentication
pub struct AuthServer {
    addr: SocketAddr,
    accounts: Arc<RwLock<Accounts>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl AuthServer {
    /// Bind to an ephemeral port on 127.0.0.1 and start serving
    pub async fn start(username: &str, password: &str) -> hyper::Result<Self> {
        Self::start_on(IpAddr::V4(Ipv4Addr::LOCALHOST), username, password).await
    }

    /// Bind to an ephemeral port on `ip` and start serving
    ///
    /// Fails when the address family is unavailable, e.g. `::1` on a host
    /// without IPv6.
    pub async fn start_on(ip: IpAddr, username: &str, password: &str) -> hyper::Result<Self> {
        let accounts = Arc::new(RwLock::new(Accounts {
            username: username.to_string(),
            password: password.to_string(),
        }));

        let shared = accounts.clone();
        let make_svc = make_service_fn(move |_conn| {
            let accounts = shared.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    let accounts = accounts.clone();
                    async move { Ok::<_, Infallible>(handle(&accounts, req)) }
                }))
            }
        });

        let server = Server::try_bind(&SocketAddr::new(ip, 0))?.serve(make_svc);
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();
        let graceful = server.with_graceful_shutdown(async {
            let _ = rx.await;
        });
        let handle = tokio::spawn(async move {
            let _ = graceful.await;
        });
        debug!("fixture auth server listening on {}", addr);

        Ok(Self {
            addr,
            accounts,
            shutdown: Some(tx),
            handle,
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Change the accepted password, as an operator rotating it would
    pub fn set_password(&self, password: &str) {
        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        accounts.password = password.to_string();
    }

    /// Stop serving and wait for the server task to finish
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

fn handle(accounts: &RwLock<Accounts>, req: Request<Body>) -> Response<Body> {
    if req.uri().path() != "/authenticate" {
        return respond(StatusCode::NOT_FOUND, "Not Found");
    }

    let Some(header_value) = req.headers().get(header::AUTHORIZATION) else {
        let mut resp = respond(StatusCode::UNAUTHORIZED, "");
        resp.headers_mut()
            .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Basic"));
        return resp;
    };

    let accepted = header_value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| general_purpose::STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .and_then(|pair| {
            pair.split_once(':')
                .map(|(u, p)| (u.to_string(), p.to_string()))
        })
        .map(|(username, password)| {
            let accounts = accounts
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            username == accounts.username && password == accounts.password
        })
        .unwrap_or(false);

    if accepted {
        respond(StatusCode::OK, "<main><p>Authenticated</p></main>")
    } else {
        respond(StatusCode::UNAUTHORIZED, "<main><p>Unauthorized</p></main>")
    }
}

fn respond(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut resp = Response::new(Body::from(body));
    *resp.status_mut() = status;
    resp
}

/// Write a stand-in `systemctl` that reports `state` for every unit
///
/// Mirrors `systemctl is-active`: prints the state, exits 0 only when active.
#[cfg(unix)]
pub fn fake_systemctl(dir: &Path, state: &str) -> std::io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("systemctl");
    std::fs::write(
        &path,
        format!("#!/bin/sh\necho {state}\n[ \"{state}\" = active ]\n"),
    )?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Whether a `curl` binary is on PATH
pub fn curl_available() -> bool {
    std::process::Command::new("curl")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
