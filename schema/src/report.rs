//! Step and run reports produced by an acceptance run

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Polarity;

/// The five ordered steps of an acceptance run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StepName {
    /// Wait for the service unit to become active
    WaitForUnit,
    /// Wait for the HTTP port to accept connections
    WaitForPort,
    /// Request without credentials
    ProbeAnonymous,
    /// Request with the wrong password
    ProbeWrongPassword,
    /// Request with the valid credential pair
    ProbeValidCredentials,
}

impl StepName {
    /// 1-based position in the run
    pub fn ordinal(&self) -> usize {
        match self {
            StepName::WaitForUnit => 1,
            StepName::WaitForPort => 2,
            StepName::ProbeAnonymous => 3,
            StepName::ProbeWrongPassword => 4,
            StepName::ProbeValidCredentials => 5,
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepName::WaitForUnit => "wait-for-unit",
            StepName::WaitForPort => "wait-for-port",
            StepName::ProbeAnonymous => "probe-anonymous",
            StepName::ProbeWrongPassword => "probe-wrong-password",
            StepName::ProbeValidCredentials => "probe-valid-credentials",
        };
        write!(f, "step {} ({})", self.ordinal(), name)
    }
}

/// Result of one completed step
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    /// Which step ran
    pub step: StepName,
    /// Human-readable description of what was checked
    pub detail: String,
    /// Polarity the step required (probes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Polarity>,
    /// Exit code observed from the probing command (probes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// HTTP status observed, when the transport can see it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Wall time spent in the step
    pub elapsed_ms: u64,
}

/// Summary of a passing run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Unit that was checked
    pub unit: String,
    /// Endpoint that was probed, e.g. `[::1]:8080/authenticate`
    pub endpoint: String,
    /// RFC3339 timestamp at which the run started
    pub started_at: String,
    /// Completed steps, in order
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Start an empty report stamped with the current time
    pub fn begin(unit: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            endpoint: endpoint.into(),
            started_at: current_timestamp(),
            steps: Vec::new(),
        }
    }

    /// Total wall time across all steps
    pub fn total_elapsed_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.elapsed_ms).sum()
    }
}

/// Current time in RFC3339 format
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
