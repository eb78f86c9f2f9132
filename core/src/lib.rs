//! Core functionality for authprobe
//!
//! This crate holds the acceptance check and everything it needs: the
//! [`host::ServiceHost`] capability it runs against, readiness polling,
//! TCP/HTTP probes, unit state parsing and shell process execution.

pub mod check;
pub mod config;
pub mod error;
pub mod health;
pub mod host;
#[cfg(unix)]
pub mod process;
pub mod readiness;
pub mod unit;

#[cfg(test)]
mod error_tests;

// Re-export schema types for convenience
pub use schema::*;

pub use check::AcceptanceCheck;
pub use error::{CheckError, FailureKind, Result};
pub use host::{HostCommand, LocalHost, ScriptedHost, ServiceHost};

/// Core utilities and helper functions
pub mod utils {
    use tracing::debug;

    /// Environment variable consulted for the log filter before `level`
    pub const LOG_ENV: &str = "AUTHPROBE_LOG";

    /// Initialize tracing for the application
    ///
    /// Logs go to stderr so `--json` output on stdout stays machine-readable.
    pub fn init_tracing(level: &str) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| crate::CheckError::InitializationError(e.to_string()))?;

        debug!("Tracing initialized with level: {}", level);
        Ok(())
    }
}
