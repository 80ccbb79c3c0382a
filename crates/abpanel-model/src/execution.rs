use std::fmt;

use serde::{Deserialize, Serialize};

/// A reagent whose stock cannot cover the volume a panel needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub antigen: String,
    pub metal: String,
    /// µL
    pub required: f64,
    /// µL
    pub available: f64,
}

impl Shortfall {
    pub fn missing(&self) -> f64 {
        (self.required - self.available).max(0.0)
    }
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) needs {:.2} µL, only {:.2} µL available",
            self.antigen, self.metal, self.required, self.available
        )
    }
}

/// Where an execution currently stands.
///
/// `Idle -> Validating -> (Blocked | AwaitingConfirmation) -> (Idle | Committed)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    #[default]
    Idle,
    Validating,
    Blocked,
    AwaitingConfirmation,
    Committed,
}

impl ExecutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionState::Idle => "idle",
            ExecutionState::Validating => "validating",
            ExecutionState::Blocked => "blocked",
            ExecutionState::AwaitingConfirmation => "awaiting_confirmation",
            ExecutionState::Committed => "committed",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
