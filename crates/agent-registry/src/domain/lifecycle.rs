//! # Lifecycle State Machine
//!
//! ```text
//!            pause              terminate
//!   Active ─────────→ Paused ─────────────┐
//!     ↑ │  ←───────── unpause             ↓
//!     │ └──────────────────────────→ Terminated (absorbing)
//!     │            terminate
//! ```
//!
//! Every transition is explicit and caller-initiated; nothing moves on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an agent.
///
/// The discriminants are stable and exposed through [`AgentStatus::code`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentStatus {
    /// Initial state; the agent may act.
    #[default]
    Active = 0,
    /// Temporarily suspended by its owner.
    Paused = 1,
    /// Permanent tombstone. No transition leaves this state.
    Terminated = 2,
}

impl AgentStatus {
    /// Stable numeric code (0 = Active, 1 = Paused, 2 = Terminated).
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns true for the absorbing state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Applies `action`, returning the next status.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for pause-from-Paused, unpause-from-Active
    /// and anything from Terminated.
    pub fn apply(self, action: LifecycleAction) -> Result<Self, InvalidTransition> {
        match (self, action) {
            (Self::Active, LifecycleAction::Pause) => Ok(Self::Paused),
            (Self::Paused, LifecycleAction::Unpause) => Ok(Self::Active),
            (Self::Active | Self::Paused, LifecycleAction::Terminate) => Ok(Self::Terminated),
            (from, action) => Err(InvalidTransition { from, action }),
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Owner-initiated lifecycle action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    /// Active → Paused.
    Pause,
    /// Paused → Active.
    Unpause,
    /// Active | Paused → Terminated.
    Terminate,
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Terminate => "terminate",
        };
        f.write_str(name)
    }
}

/// A transition that the state machine does not allow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidTransition {
    /// Status the agent was in.
    pub from: AgentStatus,
    /// Action that was attempted.
    pub action: LifecycleAction,
}
