//! Library side of the `authprobe` command line tool
//!
//! Resolves the effective configuration (file, then flag overrides), drives
//! an [`AcceptanceCheck`] and renders what it produced.

pub mod error;

pub use error::{CliError, Result};

use authprobe_core::config::{load_config_from_toml_path, validate};
use authprobe_core::{AcceptanceCheck, ServiceHost};
use clap::Args;
use schema::{AcceptanceConfig, ProbeTransport, RunReport, ScenarioKind, StepReport};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;

/// Target selection shared by every subcommand
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// TOML configuration file; flags below override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Unit that must become active
    #[arg(long)]
    pub unit: Option<String>,

    /// Host of the endpoint (IPv6 without brackets)
    #[arg(long)]
    pub host: Option<String>,

    /// Port of the endpoint
    #[arg(long)]
    pub port: Option<u16>,

    /// Path of the endpoint
    #[arg(long)]
    pub path: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Password used by the wrong-password probe
    #[arg(long)]
    pub wrong_password: Option<String>,

    /// How probes are issued: curl or native
    #[arg(long)]
    pub transport: Option<ProbeTransport>,

    /// systemctl binary used to query unit state
    #[arg(long)]
    pub systemctl: Option<String>,

    /// Seconds to wait for the unit
    #[arg(long)]
    pub unit_timeout: Option<u64>,

    /// Seconds to wait for the port
    #[arg(long)]
    pub port_timeout: Option<u64>,

    /// Milliseconds between readiness polls
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Seconds a single probe command may run
    #[arg(long)]
    pub command_timeout: Option<u64>,

    /// Exact HTTP status the valid probe must return (default: any 2xx)
    #[arg(long)]
    pub success_status: Option<u16>,
}

impl TargetArgs {
    /// Apply flag overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut AcceptanceConfig) {
        if let Some(unit) = &self.unit {
            config.unit = unit.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = &self.path {
            config.path = path.clone();
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(wrong) = &self.wrong_password {
            config.wrong_password = wrong.clone();
        }
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(systemctl) = &self.systemctl {
            config.systemctl = systemctl.clone();
        }
        if let Some(secs) = self.unit_timeout {
            config.unit_timeout_secs = secs;
        }
        if let Some(secs) = self.port_timeout {
            config.port_timeout_secs = secs;
        }
        if let Some(ms) = self.poll_interval {
            config.poll_interval_ms = ms;
        }
        if let Some(secs) = self.command_timeout {
            config.command_timeout_secs = secs;
        }
        if self.success_status.is_some() {
            config.success_status = self.success_status;
        }
    }

    /// Load the config file (or defaults), apply overrides and validate
    pub fn resolve(&self) -> Result<AcceptanceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                load_config_from_toml_path(path)?
            }
            None => AcceptanceConfig::default(),
        };
        self.apply(&mut config);
        validate(&config)?;
        Ok(config)
    }
}

/// Output rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Run all five steps and render the report
pub async fn run_check<H: ServiceHost>(
    check: &AcceptanceCheck<H>,
    format: OutputFormat,
) -> Result<String> {
    let report = check.run().await?;
    render_report(&report, format)
}

/// Run the readiness steps only and render the report
pub async fn run_wait<H: ServiceHost>(
    check: &AcceptanceCheck<H>,
    format: OutputFormat,
) -> Result<String> {
    let report = check.run_readiness().await?;
    render_report(&report, format)
}

/// Run one probe scenario and render its step
pub async fn run_probe<H: ServiceHost>(
    check: &AcceptanceCheck<H>,
    kind: ScenarioKind,
    format: OutputFormat,
) -> Result<String> {
    let step = check.run_probe(kind).await?;
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&step)?),
        OutputFormat::Human => Ok(format_step(&step)),
    }
}

/// Render a passing run
pub fn render_report(report: &RunReport, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} at {}", report.unit, report.endpoint);
    for step in &report.steps {
        let _ = writeln!(out, "{}", format_step(step));
    }
    let _ = write!(
        out,
        "PASS: {} step(s) in {}ms",
        report.steps.len(),
        report.total_elapsed_ms()
    );
    Ok(out)
}

fn format_step(step: &StepReport) -> String {
    let mut line = format!("  ok  {}: {}", step.step, step.detail);
    if let Some(expected) = step.expected {
        let _ = write!(line, " [expected {}", expected);
        if let Some(code) = step.exit_code {
            let _ = write!(line, ", exit {}", code);
        }
        if let Some(status) = step.http_status {
            let _ = write!(line, ", HTTP {}", status);
        }
        line.push(']');
    }
    let _ = write!(line, " ({}ms)", step.elapsed_ms);
    line
}

/// Render the probe table with the exact command each probe issues
pub fn render_scenarios<H: ServiceHost>(
    check: &AcceptanceCheck<H>,
    format: OutputFormat,
) -> Result<String> {
    let scenarios = check.scenarios();
    if format == OutputFormat::Json {
        let rows: Vec<serde_json::Value> = scenarios
            .iter()
            .map(|s| {
                serde_json::json!({
                    "kind": s.kind,
                    "expected": s.expected,
                    "command": check.request_for(s).curl_command(),
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let mut out = String::new();
    for (row, scenario) in scenarios.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}  {:<15} expect {:<8} {}",
            row + 1,
            scenario.kind.label(),
            scenario.expected.to_string(),
            check.request_for(scenario).curl_command()
        );
    }
    Ok(out.trim_end().to_string())
}
