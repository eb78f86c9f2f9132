//! Test utilities for CLI crate integration tests.
#![allow(missing_docs)]
#![allow(dead_code)]

use authprobe_core::ScriptedHost;
use schema::Credentials;
use std::time::Duration;

/// Run the given future with a timeout, failing the test if it elapses.
///
/// # Panics
///
/// Panics if the timeout elapses before the future completes.
pub async fn run_with_timeout<F, T>(duration: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(duration, fut)
        .await
        .expect("test timed out")
}

/// A host where the stock unit is active and the endpoint accepts user/password
pub fn healthy_host() -> ScriptedHost {
    ScriptedHost::new()
        .with_active_unit("webauthn-tiny.service")
        .with_open_port(8080)
        .with_endpoint_credentials(Credentials::new("user", "password"))
}
