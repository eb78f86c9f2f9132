//! The acceptance check: readiness gating followed by three credential probes
//!
//! Steps run strictly in order and the first divergence aborts the run:
//!
//! 1. the unit reaches the active state
//! 2. the port accepts TCP connections
//! 3. a request without credentials is rejected
//! 4. a request with the wrong password is rejected
//! 5. a request with the valid pair is accepted
//!
//! There is no retry at this level; retry and timeout policy for readiness
//! belongs to the [`ServiceHost`].

use schema::{
    AcceptanceConfig, Credentials, Polarity, ProbeScenario, RunReport, ScenarioKind, StepName,
    StepReport,
};
use std::time::Instant;
use tracing::{error, info};

use crate::health::authority;
use crate::host::{HostCommand, HttpRequest, ServiceHost};
use crate::Result;

/// The probe table for a configuration, in execution order
pub fn scenarios(config: &AcceptanceConfig) -> Vec<ProbeScenario> {
    ScenarioKind::ALL
        .into_iter()
        .map(|kind| ProbeScenario {
            kind,
            credentials: credentials_for(config, kind),
            expected: kind.expected(),
        })
        .collect()
}

fn credentials_for(config: &AcceptanceConfig, kind: ScenarioKind) -> Option<Credentials> {
    match kind {
        ScenarioKind::Anonymous => None,
        ScenarioKind::WrongPassword => Some(Credentials::new(
            config.username.clone(),
            config.wrong_password.clone(),
        )),
        ScenarioKind::Valid => Some(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        )),
    }
}

/// Step a probe scenario runs as
pub fn step_for(kind: ScenarioKind) -> StepName {
    match kind {
        ScenarioKind::Anonymous => StepName::ProbeAnonymous,
        ScenarioKind::WrongPassword => StepName::ProbeWrongPassword,
        ScenarioKind::Valid => StepName::ProbeValidCredentials,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Acceptance check bound to a host and a configuration
#[derive(Debug)]
pub struct AcceptanceCheck<H> {
    host: H,
    config: AcceptanceConfig,
}

impl<H: ServiceHost> AcceptanceCheck<H> {
    pub fn new(host: H, config: AcceptanceConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &AcceptanceConfig {
        &self.config
    }

    /// Endpoint as shown in reports, e.g. `[::1]:8080/authenticate`
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            authority(&self.config.host, self.config.port),
            self.config.path
        )
    }

    pub fn scenarios(&self) -> Vec<ProbeScenario> {
        scenarios(&self.config)
    }

    /// The request a scenario sends
    pub fn request_for(&self, scenario: &ProbeScenario) -> HttpRequest {
        HttpRequest::new(
            self.config.host.clone(),
            self.config.port,
            self.config.path.clone(),
        )
        .with_credentials(scenario.credentials.clone())
    }

    /// Run all five steps
    pub async fn run(&self) -> Result<RunReport> {
        info!(
            "acceptance check of {} at {}",
            self.config.unit,
            self.endpoint()
        );
        let mut report = RunReport::begin(self.config.unit.clone(), self.endpoint());

        self.readiness_steps(&mut report).await?;
        for scenario in self.scenarios() {
            report.steps.push(self.probe(&scenario).await?);
        }

        info!(
            "acceptance check passed: {} steps in {}ms",
            report.steps.len(),
            report.total_elapsed_ms()
        );
        Ok(report)
    }

    /// Run only the unit and port waits
    pub async fn run_readiness(&self) -> Result<RunReport> {
        let mut report = RunReport::begin(self.config.unit.clone(), self.endpoint());
        self.readiness_steps(&mut report).await?;
        Ok(report)
    }

    /// Run a single probe scenario without waiting for readiness
    pub async fn run_probe(&self, kind: ScenarioKind) -> Result<StepReport> {
        let scenario = ProbeScenario {
            kind,
            credentials: credentials_for(&self.config, kind),
            expected: kind.expected(),
        };
        self.probe(&scenario).await
    }

    async fn readiness_steps(&self, report: &mut RunReport) -> Result<()> {
        let unit = &self.config.unit;
        let started = Instant::now();
        if let Err(e) = self.host.wait_for_unit(unit).await {
            error!("{} failed: {}", StepName::WaitForUnit, e);
            return Err(e);
        }
        report.steps.push(StepReport {
            step: StepName::WaitForUnit,
            detail: format!("unit {} is active", unit),
            expected: None,
            exit_code: None,
            http_status: None,
            elapsed_ms: elapsed_ms(started),
        });

        let port = self.config.port;
        let started = Instant::now();
        if let Err(e) = self.host.wait_for_open_port(port).await {
            error!("{} failed: {}", StepName::WaitForPort, e);
            return Err(e);
        }
        report.steps.push(StepReport {
            step: StepName::WaitForPort,
            detail: format!("port {} accepts connections", port),
            expected: None,
            exit_code: None,
            http_status: None,
            elapsed_ms: elapsed_ms(started),
        });
        Ok(())
    }

    async fn probe(&self, scenario: &ProbeScenario) -> Result<StepReport> {
        let step = step_for(scenario.kind);
        let command = HostCommand::Http(self.request_for(scenario));
        info!("{}: expecting {} from `{}`", step, scenario.expected, command);

        let started = Instant::now();
        let result = match scenario.expected {
            Polarity::Success => self.host.succeed(&command).await,
            Polarity::Failure => self.host.fail(&command).await,
        };
        let outcome = result.map_err(|e| {
            let e = e.at_step(step);
            error!("{}", e);
            e
        })?;

        Ok(StepReport {
            step,
            detail: command.to_string(),
            expected: Some(scenario.expected),
            exit_code: Some(outcome.exit_code),
            http_status: outcome.http_status,
            elapsed_ms: elapsed_ms(started),
        })
    }
}
