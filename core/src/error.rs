//! Core error types and utilities

use schema::{Polarity, StepName};
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The unit or port never became ready
    Readiness,
    /// A probe's observed polarity disagreed with the expected one
    Assertion,
    /// The check itself could not run (bad config, spawn failure, ...)
    Infrastructure,
}

/// Errors raised while gating on readiness and probing the endpoint
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Readiness timeout: {target} not ready after {waited:?}")]
    ReadinessTimeout { target: String, waited: Duration },

    #[error("Unit {unit} entered state '{state}' while waiting for it to become active")]
    UnitFailed { unit: String, state: String },

    #[error("Assertion mismatch at {step}: expected {expected}, observed {observed} (exit code {exit_code}) from `{command}`")]
    AssertionMismatch {
        step: StepName,
        expected: Polarity,
        observed: Polarity,
        exit_code: i32,
        command: String,
    },

    #[error("Command `{command}` exited with {exit_code}, expected {expected}")]
    CommandPolarity {
        command: String,
        expected: Polarity,
        exit_code: i32,
        http_status: Option<u16>,
    },

    #[error("Process error: {0}")]
    ProcessError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),
}

impl CheckError {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::ReadinessTimeout { .. } => "CHECK001",
            CheckError::UnitFailed { .. } => "CHECK002",
            CheckError::AssertionMismatch { .. } => "CHECK003",
            CheckError::CommandPolarity { .. } => "CHECK004",
            CheckError::ProcessError(_) => "CHECK005",
            CheckError::ConfigurationError(_) => "CHECK006",
            CheckError::ValidationError(_) => "CHECK007",
            CheckError::InitializationError(_) => "CHECK008",
        }
    }

    /// Classify this error for reporting
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckError::ReadinessTimeout { .. } | CheckError::UnitFailed { .. } => {
                FailureKind::Readiness
            }
            CheckError::AssertionMismatch { .. } | CheckError::CommandPolarity { .. } => {
                FailureKind::Assertion
            }
            _ => FailureKind::Infrastructure,
        }
    }

    /// Attach a step to a polarity failure raised by a host.
    ///
    /// Any other error passes through unchanged.
    pub fn at_step(self, step: StepName) -> Self {
        match self {
            CheckError::CommandPolarity {
                command,
                expected,
                exit_code,
                ..
            } => CheckError::AssertionMismatch {
                step,
                expected,
                observed: Polarity::from_exit_code(exit_code),
                exit_code,
                command,
            },
            other => other,
        }
    }
}

/// Core-specific result type
pub type Result<T> = std::result::Result<T, CheckError>;
