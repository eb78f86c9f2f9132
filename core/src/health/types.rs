//! What counts as an accepted response, and the probe trait

use async_trait::async_trait;

use super::HealthError;

/// Status codes an accepting endpoint may answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// 200..=299
    Any2xx,
    /// Exactly this status
    Status(u16),
}

impl Expect {
    /// `Status(code)` when a success status is configured, `Any2xx` otherwise
    pub fn from_success_status(status: Option<u16>) -> Self {
        status.map_or(Expect::Any2xx, Expect::Status)
    }

    pub fn matches_status(&self, status: u16) -> bool {
        match *self {
            Expect::Any2xx => (200..300).contains(&status),
            Expect::Status(expected) => status == expected,
        }
    }
}

/// A single pass/fail readiness or reachability check
#[async_trait]
pub trait Probe {
    async fn check(&self) -> Result<(), HealthError>;
}
