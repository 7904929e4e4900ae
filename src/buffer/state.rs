use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a measurement buffer. Transitions only move forward:
/// `Running -> ShuttingDown -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersisterState {
    Running,
    ShuttingDown,
    Stopped,
}

impl PersisterState {
    pub fn is_running(self) -> bool {
        self == PersisterState::Running
    }
}

impl fmt::Display for PersisterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PersisterState::Running => "running",
            PersisterState::ShuttingDown => "shutting down",
            PersisterState::Stopped => "stopped",
        };
        f.write_str(text)
    }
}

/// What happens to measurements still queued when shutdown starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainPolicy {
    /// Persist everything already queued, then stop.
    #[default]
    Graceful,
    /// Discard everything not yet handed to storage and stop.
    Abort,
}

impl fmt::Display for DrainPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainPolicy::Graceful => f.write_str("graceful"),
            DrainPolicy::Abort => f.write_str("abort"),
        }
    }
}
