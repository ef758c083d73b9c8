//! Tunnel supervision state
//!
//! Defines the two-state lifecycle of the supervised client and the
//! status snapshot reported to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tunnel client lifecycle states
///
/// The supervisor only distinguishes idle from active. An active client
/// always transitions back to idle, never to a third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TunnelState {
    /// No client process is being supervised
    Idle,

    /// A client process has been started and termination has not been
    /// confirmed
    Active,
}

impl Default for TunnelState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for TunnelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TunnelState::Idle => write!(f, "idle"),
            TunnelState::Active => write!(f, "active"),
        }
    }
}

/// Snapshot of the supervisor state for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    /// Current lifecycle state
    pub state: TunnelState,

    /// PID of the client process, when active
    pub pid: Option<u32>,

    /// When the client process was spawned, when active
    pub started_at: Option<DateTime<Utc>>,
}

impl StatusReport {
    /// Report for an idle supervisor
    pub fn idle() -> Self {
        Self {
            state: TunnelState::Idle,
            pid: None,
            started_at: None,
        }
    }

    /// Check whether the report describes a running client
    pub fn is_active(&self) -> bool {
        matches!(self.state, TunnelState::Active)
    }
}
