//! Schema definitions for authprobe
//!
//! This crate contains the serializable types shared by the acceptance check
//! and its command line front end: configuration, credential scenarios and
//! run reports. All types here implement JSON Schema generation.

pub mod config;
pub mod report;
pub mod scenario;


pub use config::{AcceptanceConfig, ProbeTransport};
pub use report::{current_timestamp, RunReport, StepName, StepReport};
pub use scenario::{Credentials, Polarity, ProbeScenario, ScenarioKind};

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::schema_for;

    #[test]
    fn test_default_config() {
        let config = AcceptanceConfig::default();
        assert_eq!(config.unit, "webauthn-tiny.service");
        assert_eq!(config.host, "::1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.path, "/authenticate");
        assert_eq!(config.username, "user");
        assert_eq!(config.password, "password");
        assert_eq!(config.transport, ProbeTransport::Curl);
        assert_eq!(config.success_status, None);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AcceptanceConfig = toml::from_str("").unwrap();
        assert_eq!(config, AcceptanceConfig::default());
    }

    #[test]
    fn test_camel_case_toml_fields() {
        let config: AcceptanceConfig = toml::from_str(
            r#"
unit = "auth.service"
port = 9090
wrongPassword = "nope"
unitTimeoutSecs = 5
transport = "native"
successStatus = 200
"#,
        )
        .unwrap();
        assert_eq!(config.unit, "auth.service");
        assert_eq!(config.port, 9090);
        assert_eq!(config.wrong_password, "nope");
        assert_eq!(config.unit_timeout_secs, 5);
        assert_eq!(config.port_timeout_secs, 900);
        assert_eq!(config.transport, ProbeTransport::Native);
        assert_eq!(config.success_status, Some(200));
    }

    #[test]
    fn test_scenario_polarity_table() {
        assert_eq!(ScenarioKind::Anonymous.expected(), Polarity::Failure);
        assert_eq!(ScenarioKind::WrongPassword.expected(), Polarity::Failure);
        assert_eq!(ScenarioKind::Valid.expected(), Polarity::Success);
        assert_eq!(
            ScenarioKind::ALL,
            [
                ScenarioKind::Anonymous,
                ScenarioKind::WrongPassword,
                ScenarioKind::Valid
            ]
        );
    }

    #[test]
    fn test_scenario_kind_parse() {
        assert_eq!("valid".parse::<ScenarioKind>(), Ok(ScenarioKind::Valid));
        assert_eq!(
            "wrong-password".parse::<ScenarioKind>(),
            Ok(ScenarioKind::WrongPassword)
        );
        assert!("admin".parse::<ScenarioKind>().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("user", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(creds.user_pass(), "user:hunter2");
    }

    #[test]
    fn test_step_display() {
        assert_eq!(StepName::WaitForUnit.to_string(), "step 1 (wait-for-unit)");
        assert_eq!(
            StepName::ProbeValidCredentials.to_string(),
            "step 5 (probe-valid-credentials)"
        );
    }

    #[test]
    fn test_polarity_from_exit_code() {
        assert_eq!(Polarity::from_exit_code(0), Polarity::Success);
        assert_eq!(Polarity::from_exit_code(22), Polarity::Failure);
        assert_eq!(Polarity::from_exit_code(7), Polarity::Failure);
    }

    #[test]
    fn test_schema_generation() {
        let _config_schema = schema_for!(AcceptanceConfig);
        let _report_schema = schema_for!(RunReport);
        let _scenario_schema = schema_for!(ProbeScenario);
    }
}
