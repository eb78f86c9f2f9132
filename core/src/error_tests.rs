#[cfg(test)]
mod tests {
    use crate::error::*;
    use schema::{Polarity, StepName};
    use std::time::Duration;

    fn polarity_error(exit_code: i32, expected: Polarity) -> CheckError {
        CheckError::CommandPolarity {
            command: "curl -v --fail '[::1]:8080/authenticate'".to_string(),
            expected,
            exit_code,
            http_status: None,
        }
    }

    #[test]
    fn test_check_error_display() {
        let err = CheckError::ReadinessTimeout {
            target: "port 8080".to_string(),
            waited: Duration::from_secs(3),
        };
        assert_eq!(
            err.to_string(),
            "Readiness timeout: port 8080 not ready after 3s"
        );

        let err = CheckError::UnitFailed {
            unit: "webauthn-tiny.service".to_string(),
            state: "failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unit webauthn-tiny.service entered state 'failed' while waiting for it to become active"
        );

        let err = CheckError::ConfigurationError("bad config".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad config");
    }

    #[test]
    fn test_at_step_converts_polarity_errors() {
        let err = polarity_error(0, Polarity::Failure).at_step(StepName::ProbeAnonymous);
        match err {
            CheckError::AssertionMismatch {
                step,
                expected,
                observed,
                exit_code,
                ref command,
            } => {
                assert_eq!(step, StepName::ProbeAnonymous);
                assert_eq!(expected, Polarity::Failure);
                assert_eq!(observed, Polarity::Success);
                assert_eq!(exit_code, 0);
                assert!(command.starts_with("curl"));
            }
            other => panic!("Expected AssertionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_at_step_leaves_other_errors_alone() {
        let err = CheckError::ProcessError("spawn failed".to_string())
            .at_step(StepName::ProbeValidCredentials);
        assert!(matches!(err, CheckError::ProcessError(_)));
    }

    #[test]
    fn test_assertion_mismatch_names_the_step() {
        let err = polarity_error(22, Polarity::Success).at_step(StepName::ProbeValidCredentials);
        let message = err.to_string();
        assert!(message.contains("step 5 (probe-valid-credentials)"), "{message}");
        assert!(message.contains("expected success, observed failure"), "{message}");
    }

    #[test]
    fn test_failure_kinds() {
        let timeout = CheckError::ReadinessTimeout {
            target: "unit".to_string(),
            waited: Duration::from_secs(1),
        };
        assert_eq!(timeout.kind(), FailureKind::Readiness);
        assert_eq!(
            polarity_error(0, Polarity::Failure).kind(),
            FailureKind::Assertion
        );
        assert_eq!(
            CheckError::ValidationError("x".to_string()).kind(),
            FailureKind::Infrastructure
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(polarity_error(0, Polarity::Failure).code(), "CHECK004");
        assert_eq!(
            CheckError::ConfigurationError("test".to_string()).code(),
            "CHECK006"
        );
        assert_eq!(
            CheckError::ValidationError("test".to_string()).code(),
            "CHECK007"
        );
        assert_eq!(
            CheckError::InitializationError("test".to_string()).code(),
            "CHECK008"
        );
        assert_eq!(
            CheckError::ProcessError("test".to_string()).code(),
            "CHECK005"
        );
    }
}
