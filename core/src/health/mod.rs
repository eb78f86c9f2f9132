//! Health checking and probing functionality
//!
//! TCP and HTTP probing primitives used to decide whether the target port
//! accepts connections and how the authentication endpoint answers.
//!
//! ## Types
//!
//! - [`Probe`]: The main trait for health check implementations
//! - [`TcpProbe`]: TCP connection-based health checking
//! - [`HttpProbe`]: HTTP request-based health checking with Basic credentials
//! - [`Expect`]: Expected response criteria for HTTP probes
//! - [`HealthError`]: Error types for health check failures

pub mod error;
pub mod http;
pub mod tcp;
pub mod types;

pub use error::HealthError;
pub use http::{HttpProbe, HttpResponse};
pub use tcp::TcpProbe;
pub use types::{Expect, Probe};

/// Format `host:port`, wrapping IPv6 literals in brackets
///
/// Host names never contain `:`, so any host that does is an IPv6 literal,
/// scoped ones (`fe80::1%eth0`) included.
pub fn authority(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
