//! The host capability the acceptance check runs against
//!
//! [`ServiceHost`] is the seam between the check's sequencing logic and the
//! machine it inspects. [`LocalHost`] talks to the real service manager,
//! network stack and shell; [`ScriptedHost`] is an in-memory stand-in with
//! canned readiness and a simulated Basic-auth endpoint.

pub mod local;
pub mod scripted;

pub use local::LocalHost;
pub use scripted::{HostCall, ScriptedHost};

use async_trait::async_trait;
use schema::{Credentials, Polarity};
use std::fmt;

use crate::health::authority;
use crate::{CheckError, Result};

/// A typed HTTP GET against the endpoint, renderable as a curl command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub credentials: Option<Credentials>,
}

impl HttpRequest {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
            credentials: None,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Scheme-less target as curl is given it, e.g. `[::1]:8080/authenticate`
    pub fn target(&self) -> String {
        format!("{}{}", authority(&self.host, self.port), self.path)
    }

    /// Absolute URL for in-process clients
    pub fn url(&self) -> String {
        format!("http://{}", self.target())
    }

    /// Arguments for `curl`; `--fail` turns HTTP errors into exit code 22
    pub fn curl_args(&self) -> Vec<String> {
        let mut args = vec!["-v".to_string(), "--fail".to_string()];
        if let Some(creds) = &self.credentials {
            args.push("-u".to_string());
            args.push(creds.user_pass());
        }
        args.push(self.target());
        args
    }

    /// The equivalent shell command line
    pub fn curl_command(&self) -> String {
        let mut line = String::from("curl");
        for arg in self.curl_args() {
            line.push(' ');
            line.push_str(&shell_quote(&arg));
        }
        line
    }
}

/// A command issued to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Opaque shell command line, run with `sh -c`
    Shell(String),
    /// HTTP probe of the endpoint
    Http(HttpRequest),
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostCommand::Shell(line) => f.write_str(line),
            HostCommand::Http(req) => f.write_str(&req.curl_command()),
        }
    }
}

/// What a host observed when running a command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// HTTP status, when the transport could see one
    pub http_status: Option<u16>,
}

impl CommandOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    pub fn polarity(&self) -> Polarity {
        Polarity::from_exit_code(self.exit_code)
    }
}

/// Capability interface over the machine under test.
///
/// Readiness waits must be idempotent: once the unit is active or the port
/// open, calling them again returns immediately.
#[async_trait]
pub trait ServiceHost: Send + Sync {
    /// Block until `unit` is active, failing on timeout or a failed unit
    async fn wait_for_unit(&self, unit: &str) -> Result<()>;

    /// Block until `port` accepts TCP connections
    async fn wait_for_open_port(&self, port: u16) -> Result<()>;

    /// Run a command once and report its outcome, whatever the exit code
    async fn execute(&self, command: &HostCommand) -> Result<CommandOutcome>;

    /// Run a command that must exit zero
    async fn succeed(&self, command: &HostCommand) -> Result<CommandOutcome> {
        let outcome = self.execute(command).await?;
        require_polarity(command, outcome, Polarity::Success)
    }

    /// Run a command that must exit non-zero
    async fn fail(&self, command: &HostCommand) -> Result<CommandOutcome> {
        let outcome = self.execute(command).await?;
        require_polarity(command, outcome, Polarity::Failure)
    }
}

fn require_polarity(
    command: &HostCommand,
    outcome: CommandOutcome,
    expected: Polarity,
) -> Result<CommandOutcome> {
    if outcome.polarity() == expected {
        Ok(outcome)
    } else {
        Err(CheckError::CommandPolarity {
            command: command.to_string(),
            expected,
            exit_code: outcome.exit_code,
            http_status: outcome.http_status,
        })
    }
}

/// Quote a word for POSIX sh if it contains anything beyond a safe set
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-@%+=:,./".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> HttpRequest {
        HttpRequest::new("::1", 8080, "/authenticate")
    }

    #[test]
    fn test_curl_rendering_matches_probe_lines() {
        assert_eq!(
            endpoint().curl_command(),
            "curl -v --fail '[::1]:8080/authenticate'"
        );
        assert_eq!(
            endpoint()
                .with_credentials(Some(Credentials::new("user", "wrong_password")))
                .curl_command(),
            "curl -v --fail -u user:wrong_password '[::1]:8080/authenticate'"
        );
        assert_eq!(
            endpoint()
                .with_credentials(Some(Credentials::new("user", "password")))
                .curl_command(),
            "curl -v --fail -u user:password '[::1]:8080/authenticate'"
        );
    }

    #[test]
    fn test_url_and_target() {
        assert_eq!(endpoint().target(), "[::1]:8080/authenticate");
        assert_eq!(endpoint().url(), "http://[::1]:8080/authenticate");
        let v4 = HttpRequest::new("127.0.0.1", 9000, "/authenticate");
        assert_eq!(v4.url(), "http://127.0.0.1:9000/authenticate");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("user:password"), "user:password");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_host_command_display() {
        let shell = HostCommand::Shell("systemctl status foo".to_string());
        assert_eq!(shell.to_string(), "systemctl status foo");
        let http = HostCommand::Http(endpoint());
        assert!(http.to_string().starts_with("curl -v --fail"));
    }

    #[test]
    fn test_require_polarity() {
        let cmd = HostCommand::Http(endpoint());
        let ok = CommandOutcome::default();
        assert!(require_polarity(&cmd, ok.clone(), Polarity::Success).is_ok());

        match require_polarity(&cmd, ok, Polarity::Failure) {
            Err(CheckError::CommandPolarity {
                expected, exit_code, ..
            }) => {
                assert_eq!(expected, Polarity::Failure);
                assert_eq!(exit_code, 0);
            }
            other => panic!("Expected CommandPolarity, got {other:?}"),
        }

        let rejected = CommandOutcome {
            exit_code: 22,
            http_status: Some(401),
            ..Default::default()
        };
        assert!(require_polarity(&cmd, rejected, Polarity::Failure).is_ok());
    }
}
