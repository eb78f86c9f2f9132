//! Service manager unit states as reported by `systemctl is-active`

use std::fmt;

/// Active state of a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    Active,
    Reloading,
    Activating,
    Deactivating,
    Inactive,
    Failed,
    /// Anything systemctl printed that is not a known state
    Unknown(String),
}

impl UnitState {
    /// Parse the first line of `systemctl is-active` output
    pub fn parse(output: &str) -> Self {
        match output.lines().next().unwrap_or("").trim() {
            "active" => UnitState::Active,
            "reloading" => UnitState::Reloading,
            "activating" => UnitState::Activating,
            "deactivating" => UnitState::Deactivating,
            "inactive" => UnitState::Inactive,
            "failed" => UnitState::Failed,
            other => UnitState::Unknown(other.to_string()),
        }
    }

    /// The unit is up and serving
    pub fn is_ready(&self) -> bool {
        matches!(self, UnitState::Active | UnitState::Reloading)
    }

    /// The unit will not become active without outside intervention
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, UnitState::Failed)
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitState::Active => write!(f, "active"),
            UnitState::Reloading => write!(f, "reloading"),
            UnitState::Activating => write!(f, "activating"),
            UnitState::Deactivating => write!(f, "deactivating"),
            UnitState::Inactive => write!(f, "inactive"),
            UnitState::Failed => write!(f, "failed"),
            UnitState::Unknown(s) => write!(f, "{}", s),
        }
    }
}
