//! The machine this process runs on

use async_trait::async_trait;
use schema::{AcceptanceConfig, ProbeTransport};
use std::time::Duration;
use tracing::{debug, info};

use super::{CommandOutcome, HostCommand, HttpRequest, ServiceHost};
use crate::health::{Expect, HealthError, HttpProbe, TcpProbe};
use crate::process::{run_shell, run_with_timeout};
use crate::readiness::{poll_until, wait_for_probe};
use crate::unit::UnitState;
use crate::{CheckError, Result};

// curl exit codes reproduced by the native transport
const CURL_OK: i32 = 0;
const CURL_MALFORMED_URL: i32 = 3;
const CURL_COULDNT_CONNECT: i32 = 7;
const CURL_HTTP_RETURNED_ERROR: i32 = 22;
const CURL_OPERATION_TIMEDOUT: i32 = 28;

/// Runs readiness waits and probes against the local machine
///
/// Units are queried through `systemctl is-active`, ports with a TCP connect,
/// shell commands through `sh -c`, and HTTP probes either with curl or with
/// the in-process client depending on the configured [`ProbeTransport`].
#[derive(Debug, Clone)]
pub struct LocalHost {
    host: String,
    systemctl: String,
    transport: ProbeTransport,
    success_status: Option<u16>,
    unit_timeout: Duration,
    port_timeout: Duration,
    poll_interval: Duration,
    command_timeout: Duration,
}

impl LocalHost {
    pub fn from_config(config: &AcceptanceConfig) -> Self {
        Self {
            host: config.host.clone(),
            systemctl: config.systemctl.clone(),
            transport: config.transport,
            success_status: config.success_status,
            unit_timeout: config.unit_timeout(),
            port_timeout: config.port_timeout(),
            poll_interval: config.poll_interval(),
            command_timeout: config.command_timeout(),
        }
    }

    /// Current state of `unit` as reported by the service manager
    pub async fn unit_state(&self, unit: &str) -> Result<UnitState> {
        // is-active exits non-zero for anything but active; only stdout matters
        let output = run_with_timeout(
            &self.systemctl,
            &["is-active", unit],
            self.command_timeout,
        )
        .await?;
        let state = UnitState::parse(&output.stdout);
        debug!("unit {} is {}", unit, state);
        Ok(state)
    }

    async fn execute_curl(&self, request: &HttpRequest) -> Result<CommandOutcome> {
        let args = request.curl_args();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = run_with_timeout("curl", &arg_refs, self.command_timeout).await?;
        let http_status = parse_curl_status(&output.stderr);
        Ok(CommandOutcome {
            exit_code: pin_success_status(output.exit_code, http_status, self.success_status),
            http_status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn execute_native(&self, request: &HttpRequest) -> Result<CommandOutcome> {
        let mut probe = HttpProbe::new(
            request.url(),
            Expect::from_success_status(self.success_status),
            self.command_timeout,
        );
        if let Some(creds) = &request.credentials {
            probe = probe.with_credentials(creds.clone());
        }

        let outcome = match probe.fetch().await {
            Ok(response) => {
                CommandOutcome {
                    exit_code: native_exit_code(response.status, self.success_status),
                    stdout: response.body,
                    stderr: String::new(),
                    http_status: Some(response.status),
                }
            }
            Err(e) => {
                let exit_code = match &e {
                    HealthError::InvalidRequest(_) => CURL_MALFORMED_URL,
                    HealthError::Timeout(_) => CURL_OPERATION_TIMEDOUT,
                    _ => CURL_COULDNT_CONNECT,
                };
                CommandOutcome {
                    exit_code,
                    stdout: String::new(),
                    stderr: e.to_string(),
                    http_status: None,
                }
            }
        };
        Ok(outcome)
    }
}

#[async_trait]
impl ServiceHost for LocalHost {
    async fn wait_for_unit(&self, unit: &str) -> Result<()> {
        info!("waiting for unit {}", unit);
        let waited = poll_until(
            &format!("unit {}", unit),
            self.unit_timeout,
            self.poll_interval,
            || async move {
                let state = self.unit_state(unit).await?;
                if state.is_terminal_failure() {
                    return Err(CheckError::UnitFailed {
                        unit: unit.to_string(),
                        state: state.to_string(),
                    });
                }
                Ok(state.is_ready())
            },
        )
        .await?;
        info!("unit {} is active ({:?})", unit, waited);
        Ok(())
    }

    async fn wait_for_open_port(&self, port: u16) -> Result<()> {
        info!("waiting for {} port {}", self.host, port);
        let probe = TcpProbe::new(
            self.host.clone(),
            port,
            self.command_timeout.min(self.port_timeout),
        );
        let waited = wait_for_probe(
            &format!("port {}", probe.address()),
            &probe,
            self.port_timeout,
            self.poll_interval,
        )
        .await?;
        info!("port {} is open ({:?})", probe.address(), waited);
        Ok(())
    }

    async fn execute(&self, command: &HostCommand) -> Result<CommandOutcome> {
        debug!("executing: {}", command);
        let outcome = match command {
            HostCommand::Shell(line) => {
                let output = run_shell(line, self.command_timeout).await?;
                CommandOutcome {
                    exit_code: output.exit_code,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    http_status: None,
                }
            }
            HostCommand::Http(request) => match self.transport {
                ProbeTransport::Curl => self.execute_curl(request).await?,
                ProbeTransport::Native => self.execute_native(request).await?,
            },
        };
        debug!(
            "`{}` exited with {} (http status {:?})",
            command, outcome.exit_code, outcome.http_status
        );
        Ok(outcome)
    }
}

/// `curl --fail` semantics for a completed exchange: 22 from status 400 up,
/// 0 below (redirects are not followed and count as success).
fn native_exit_code(status: u16, success_status: Option<u16>) -> i32 {
    let exit_code = if status >= 400 {
        CURL_HTTP_RETURNED_ERROR
    } else {
        CURL_OK
    };
    pin_success_status(exit_code, Some(status), success_status)
}

/// With a pinned success status, a zero exit with any other status becomes 22
fn pin_success_status(exit_code: i32, status: Option<u16>, success_status: Option<u16>) -> i32 {
    match success_status {
        Some(expected) if exit_code == CURL_OK && status != Some(expected) => {
            CURL_HTTP_RETURNED_ERROR
        }
        _ => exit_code,
    }
}

/// Last response status line in curl's verbose output (`< HTTP/1.1 401 ...`)
fn parse_curl_status(stderr: &str) -> Option<u16> {
    stderr
        .lines()
        .filter_map(|line| line.strip_prefix("< HTTP/"))
        .filter_map(|rest| rest.split_whitespace().nth(1))
        .filter_map(|code| code.parse().ok())
        .last()
}
