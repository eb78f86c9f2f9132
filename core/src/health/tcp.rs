//! Port readiness: can a TCP connection be established at all

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::debug;

use super::{authority, HealthError, Probe};

/// Connects to `host:port` and drops the connection straight away.
///
/// Names are resolved on every attempt and each resulting address is tried
/// in turn, so `localhost` passes whether the service bound `::1` or
/// `127.0.0.1`. The timeout covers resolution and all connect attempts.
///
/// ```rust
/// use authprobe_core::health::{Probe, TcpProbe};
/// use std::time::Duration;
///
/// # async fn example() {
/// let probe = TcpProbe::new("::1", 8080, Duration::from_secs(1));
/// assert_eq!(probe.address(), "[::1]:8080");
/// let _open = probe.check().await.is_ok();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// `host:port`, with IPv6 literals bracketed
    #[must_use]
    pub fn address(&self) -> String {
        authority(&self.host, self.port)
    }

    async fn connect_any(&self, address: &str) -> io::Result<()> {
        let mut last_err = None;
        for addr in lookup_host(address).await? {
            match TcpStream::connect(addr).await {
                Ok(_stream) => {
                    debug!("{} accepted a connection on {}", address, addr);
                    return Ok(());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{address} resolved to nothing"))
        }))
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn check(&self) -> Result<(), HealthError> {
        let address = self.address();
        match timeout(self.timeout, self.connect_any(&address)).await {
            Ok(result) => result.map_err(|e| {
                debug!("{} not accepting connections: {}", address, e);
                HealthError::Tcp(e)
            }),
            Err(_) => Err(HealthError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn listening_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        tokio::spawn(async move { while listener.accept().await.is_ok() {} });
        port
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        listener.local_addr().expect("addr").port()
    }

    #[tokio::test]
    async fn test_open_port() {
        let port = listening_port().await;
        let probe = TcpProbe::new("127.0.0.1", port, Duration::from_secs(1));
        assert!(probe.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_localhost_tries_every_address() {
        // Only the IPv4 loopback is bound; localhost may resolve to ::1 first
        let port = listening_port().await;
        let probe = TcpProbe::new("localhost", port, Duration::from_secs(2));
        assert!(probe.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_port_is_refused() {
        let port = closed_port().await;
        let probe = TcpProbe::new("127.0.0.1", port, Duration::from_secs(1));
        match probe.check().await {
            Err(HealthError::Tcp(_)) => {}
            other => panic!("Expected HealthError::Tcp, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unroutable_address_times_out() {
        let probe = TcpProbe::new("10.255.255.1", 8080, Duration::from_millis(100));
        match probe.check().await {
            Err(HealthError::Timeout(d)) => assert_eq!(d, Duration::from_millis(100)),
            // No default route: refused immediately
            Err(HealthError::Tcp(_)) => {}
            other => panic!("Expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_address() {
        assert_eq!(
            TcpProbe::new("::1", 8080, Duration::from_secs(1)).address(),
            "[::1]:8080"
        );
        assert_eq!(
            TcpProbe::new("127.0.0.1", 8080, Duration::from_secs(1)).address(),
            "127.0.0.1:8080"
        );
    }
}
