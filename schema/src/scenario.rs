//! Credential scenarios and expected probe outcomes

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected or observed polarity of a probe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    /// The probing command exited zero (2xx response)
    Success,
    /// The probing command exited non-zero (4xx/5xx or connection error)
    Failure,
}

impl Polarity {
    /// Polarity implied by a process exit code
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Polarity::Success
        } else {
            Polarity::Failure
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Success => write!(f, "success"),
            Polarity::Failure => write!(f, "failure"),
        }
    }
}

/// A username/password pair sent with HTTP Basic authentication
#[derive(Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create a new credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The `user:password` form used by curl's `-u` and the Basic scheme
    pub fn user_pass(&self) -> String {
        format!("{}:{}", self.username, self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The three credential scenarios exercised against the endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// No Authorization header at all
    Anonymous,
    /// Valid username with an incorrect password
    WrongPassword,
    /// The valid credential pair
    Valid,
}

impl ScenarioKind {
    /// All scenarios in execution order
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Anonymous,
        ScenarioKind::WrongPassword,
        ScenarioKind::Valid,
    ];

    /// Polarity the endpoint must produce for this scenario
    pub fn expected(&self) -> Polarity {
        match self {
            ScenarioKind::Anonymous | ScenarioKind::WrongPassword => Polarity::Failure,
            ScenarioKind::Valid => Polarity::Success,
        }
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::Anonymous => "anonymous",
            ScenarioKind::WrongPassword => "wrong-password",
            ScenarioKind::Valid => "valid",
        }
    }
}

impl std::str::FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::ALL
            .into_iter()
            .find(|k| k.label() == s)
            .ok_or_else(|| {
                format!("unknown scenario '{s}' (expected anonymous, wrong-password or valid)")
            })
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A concrete probe: which scenario, what credentials, what outcome is required
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeScenario {
    /// Scenario this probe belongs to
    pub kind: ScenarioKind,
    /// Credentials to send, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Required polarity
    pub expected: Polarity,
}
