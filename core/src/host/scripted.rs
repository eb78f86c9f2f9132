//! An in-memory host with canned readiness and a simulated Basic-auth endpoint
//!
//! Useful wherever the sequencing of a check matters more than the machine:
//! unit tests, dry runs, and documentation examples.

use async_trait::async_trait;
use schema::Credentials;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

use super::{CommandOutcome, HostCommand, HttpRequest, ServiceHost};
use crate::{CheckError, Result};

/// Log entry for every call made against a [`ScriptedHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    WaitForUnit { unit: String },
    WaitForOpenPort { port: u16 },
    Execute { command: String },
}

#[derive(Debug, Default)]
struct Script {
    active_units: HashSet<String>,
    failed_units: HashSet<String>,
    open_ports: HashSet<u16>,
    endpoint_credentials: Option<Credentials>,
    shell_exit_codes: HashMap<String, i32>,
}

/// A fake [`ServiceHost`] that records calls
///
/// HTTP probes are answered like a Basic-auth endpoint guarding one
/// credential pair: 200 with exit code 0 for the right pair, 401 with
/// curl's `--fail` exit code 22 otherwise, and exit code 7 when the
/// request's port is not open.
///
/// ```rust
/// use authprobe_core::host::{HostCommand, HttpRequest, ScriptedHost, ServiceHost};
/// use schema::Credentials;
///
/// # async fn example() -> authprobe_core::Result<()> {
/// let host = ScriptedHost::new()
///     .with_active_unit("webauthn-tiny.service")
///     .with_open_port(8080)
///     .with_endpoint_credentials(Credentials::new("user", "password"));
///
/// let anonymous = HostCommand::Http(HttpRequest::new("::1", 8080, "/authenticate"));
/// host.fail(&anonymous).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ScriptedHost {
    script: Mutex<Script>,
    calls: Mutex<Vec<HostCall>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_active_unit(self, unit: impl Into<String>) -> Self {
        self.script().active_units.insert(unit.into());
        self
    }

    /// A unit that sits in the `failed` state
    #[must_use]
    pub fn with_failed_unit(self, unit: impl Into<String>) -> Self {
        self.script().failed_units.insert(unit.into());
        self
    }

    #[must_use]
    pub fn with_open_port(self, port: u16) -> Self {
        self.script().open_ports.insert(port);
        self
    }

    /// The credential pair the simulated endpoint accepts
    #[must_use]
    pub fn with_endpoint_credentials(self, credentials: Credentials) -> Self {
        self.script().endpoint_credentials = Some(credentials);
        self
    }

    /// Exit code for an exact shell command line (default 0)
    #[must_use]
    pub fn with_shell_exit_code(self, command: impl Into<String>, exit_code: i32) -> Self {
        self.script().shell_exit_codes.insert(command.into(), exit_code);
        self
    }

    /// Change the accepted password while the host is in use
    pub fn rotate_password(&self, password: impl Into<String>) {
        if let Some(creds) = self.script().endpoint_credentials.as_mut() {
            creds.password = password.into();
        }
    }

    /// Get a copy of all recorded calls
    pub fn calls(&self) -> Vec<HostCall> {
        lock(&self.calls).clone()
    }

    /// Get the count of recorded calls
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        lock(&self.script)
    }

    fn record(&self, call: HostCall) {
        lock(&self.calls).push(call);
    }

    fn answer_http(&self, request: &HttpRequest) -> CommandOutcome {
        let script = self.script();
        if !script.open_ports.contains(&request.port) {
            return CommandOutcome {
                exit_code: 7,
                stderr: format!("curl: (7) Failed to connect to {}", request.target()),
                ..Default::default()
            };
        }

        let accepted = match (&script.endpoint_credentials, &request.credentials) {
            (Some(valid), Some(sent)) => valid == sent,
            _ => false,
        };
        if accepted {
            CommandOutcome {
                exit_code: 0,
                http_status: Some(200),
                ..Default::default()
            }
        } else {
            CommandOutcome {
                exit_code: 22,
                stderr: "curl: (22) The requested URL returned error: 401".to_string(),
                http_status: Some(401),
                ..Default::default()
            }
        }
    }
}

// A poisoned lock only means another test thread panicked; the data is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ServiceHost for ScriptedHost {
    async fn wait_for_unit(&self, unit: &str) -> Result<()> {
        info!("ScriptedHost: waiting for unit {}", unit);
        self.record(HostCall::WaitForUnit {
            unit: unit.to_string(),
        });

        let script = self.script();
        if script.failed_units.contains(unit) {
            return Err(CheckError::UnitFailed {
                unit: unit.to_string(),
                state: "failed".to_string(),
            });
        }
        if !script.active_units.contains(unit) {
            return Err(CheckError::ReadinessTimeout {
                target: format!("unit {}", unit),
                waited: Duration::ZERO,
            });
        }
        Ok(())
    }

    async fn wait_for_open_port(&self, port: u16) -> Result<()> {
        info!("ScriptedHost: waiting for port {}", port);
        self.record(HostCall::WaitForOpenPort { port });

        if !self.script().open_ports.contains(&port) {
            return Err(CheckError::ReadinessTimeout {
                target: format!("port {}", port),
                waited: Duration::ZERO,
            });
        }
        Ok(())
    }

    async fn execute(&self, command: &HostCommand) -> Result<CommandOutcome> {
        self.record(HostCall::Execute {
            command: command.to_string(),
        });

        let outcome = match command {
            HostCommand::Shell(line) => CommandOutcome {
                exit_code: self.script().shell_exit_codes.get(line).copied().unwrap_or(0),
                ..Default::default()
            },
            HostCommand::Http(request) => self.answer_http(request),
        };
        debug!("ScriptedHost: `{}` -> {}", command, outcome.exit_code);
        Ok(outcome)
    }
}
