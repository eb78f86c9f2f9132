//! Acceptance check configuration
//!
//! Every field has a serde default so an empty TOML document describes the
//! stock target: `webauthn-tiny.service` answering Basic auth on
//! `[::1]:8080/authenticate`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How HTTP probes are executed on the host
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ProbeTransport {
    /// Shell out to `curl -v --fail`, judging the process exit status
    #[default]
    Curl,
    /// Issue the request in-process and map the result onto curl's exit codes
    Native,
}

impl std::str::FromStr for ProbeTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "curl" => Ok(ProbeTransport::Curl),
            "native" => Ok(ProbeTransport::Native),
            other => Err(format!("unknown transport '{other}' (expected curl or native)")),
        }
    }
}

/// Complete configuration for one acceptance run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceConfig {
    /// Service manager unit that must reach the active state
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Host the HTTP endpoint is reached on (IPv6 literals without brackets)
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port of the HTTP endpoint
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the Basic-auth protected endpoint
    #[serde(default = "default_path")]
    pub path: String,

    /// Username of the valid credential pair
    #[serde(default = "default_username")]
    pub username: String,

    /// Password of the valid credential pair
    #[serde(default = "default_password")]
    pub password: String,

    /// Password sent in the wrong-credentials probe
    #[serde(default = "default_wrong_password")]
    pub wrong_password: String,

    /// Maximum time to wait for the unit to become active
    #[serde(default = "default_readiness_timeout_secs")]
    pub unit_timeout_secs: u64,

    /// Maximum time to wait for the port to accept connections
    #[serde(default = "default_readiness_timeout_secs")]
    pub port_timeout_secs: u64,

    /// Delay between readiness polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on a single probe command
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Status a successful probe must return; any 2xx when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_status: Option<u16>,

    /// How HTTP probes are executed
    #[serde(default)]
    pub transport: ProbeTransport,

    /// Path or name of the `systemctl` binary used for unit queries
    #[serde(default = "default_systemctl")]
    pub systemctl: String,
}

impl AcceptanceConfig {
    /// Unit readiness timeout as a Duration
    pub fn unit_timeout(&self) -> Duration {
        Duration::from_secs(self.unit_timeout_secs)
    }

    /// Port readiness timeout as a Duration
    pub fn port_timeout(&self) -> Duration {
        Duration::from_secs(self.port_timeout_secs)
    }

    /// Readiness poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-command timeout as a Duration
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            host: default_host(),
            port: default_port(),
            path: default_path(),
            username: default_username(),
            password: default_password(),
            wrong_password: default_wrong_password(),
            unit_timeout_secs: default_readiness_timeout_secs(),
            port_timeout_secs: default_readiness_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            command_timeout_secs: default_command_timeout_secs(),
            success_status: None,
            transport: ProbeTransport::default(),
            systemctl: default_systemctl(),
        }
    }
}

fn default_unit() -> String {
    "webauthn-tiny.service".to_string()
}

fn default_host() -> String {
    "::1".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/authenticate".to_string()
}

fn default_username() -> String {
    "user".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_wrong_password() -> String {
    "wrong_password".to_string()
}

// Matches the VM test driver's default wait of 15 minutes.
const fn default_readiness_timeout_secs() -> u64 {
    900
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

const fn default_command_timeout_secs() -> u64 {
    30
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}
