//! Configuration loading and validation for acceptance runs
//!
//! Parses TOML into `schema::AcceptanceConfig` (serde supplies defaults for
//! every missing field) and validates it with field-path error messages.

use crate::{CheckError, Result};
use schema::AcceptanceConfig;
use std::fs;
use std::path::Path;

/// Load and validate a configuration file
pub fn load_config_from_toml_path(path: impl AsRef<Path>) -> Result<AcceptanceConfig> {
    let data = fs::read_to_string(&path).map_err(|e| {
        CheckError::ConfigurationError(format!("Failed to read config {:?}: {}", path.as_ref(), e))
    })?;
    load_config_from_toml_str(&data)
}

/// Load and validate a configuration from a TOML string
pub fn load_config_from_toml_str(input: &str) -> Result<AcceptanceConfig> {
    let config: AcceptanceConfig = toml::from_str(input)
        .map_err(|e| CheckError::ConfigurationError(format!("TOML parse error: {}", e)))?;
    validate(&config)?;
    Ok(config)
}

/// Validate a configuration, reporting the first offending field
pub fn validate(config: &AcceptanceConfig) -> Result<()> {
    if config.unit.trim().is_empty() {
        return Err(CheckError::ValidationError("unit: cannot be empty".to_string()));
    }
    if config.host.trim().is_empty() {
        return Err(CheckError::ValidationError("host: cannot be empty".to_string()));
    }
    if config.host.starts_with('[') {
        return Err(CheckError::ValidationError(
            "host: give IPv6 addresses without brackets".to_string(),
        ));
    }
    if config.host.contains('%') {
        return Err(CheckError::ValidationError(
            "host: scoped IPv6 addresses (with a %zone) are not supported".to_string(),
        ));
    }
    if config.port == 0 {
        return Err(CheckError::ValidationError(
            "port: must be 1..=65535".to_string(),
        ));
    }
    if !config.path.starts_with('/') {
        return Err(CheckError::ValidationError(format!(
            "path: must start with '/', got '{}'",
            config.path
        )));
    }
    if config.username.is_empty() || config.username.contains(':') {
        return Err(CheckError::ValidationError(
            "username: must be non-empty and must not contain ':'".to_string(),
        ));
    }
    if config.password == config.wrong_password {
        return Err(CheckError::ValidationError(
            "wrongPassword: must differ from password".to_string(),
        ));
    }
    if config.poll_interval_ms == 0 {
        return Err(CheckError::ValidationError(
            "pollIntervalMs: must be > 0".to_string(),
        ));
    }
    if config.command_timeout_secs == 0 {
        return Err(CheckError::ValidationError(
            "commandTimeoutSecs: must be > 0".to_string(),
        ));
    }
    if let Some(status) = config.success_status {
        // curl --fail rejects 400 and above, so such a status could never pass
        if !(100..400).contains(&status) {
            return Err(CheckError::ValidationError(format!(
                "successStatus: {} must be an HTTP status below 400",
                status
            )));
        }
    }
    if config.systemctl.trim().is_empty() {
        return Err(CheckError::ValidationError(
            "systemctl: cannot be empty".to_string(),
        ));
    }
    Ok(())
}
