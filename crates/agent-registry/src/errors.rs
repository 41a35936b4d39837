//! # Error Types
//!
//! All error types for the agent registry.
//!
//! Every [`RegistryError`] carries a stable [`ErrorKind`] and a human-readable
//! reason. An operation that returns an error has left no trace in the registry.

use crate::domain::authorization::Operation;
use crate::domain::ledger::LedgerError;
use crate::domain::lifecycle::{AgentStatus, LifecycleAction};
use crate::domain::value_objects::{Address, AgentId, U256};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// ERROR KINDS
// =============================================================================

/// Stable classification of a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Null logic reference or otherwise malformed input.
    Validation,
    /// Unknown agent id.
    NotFound,
    /// Caller lacks owner or governance rights.
    Authorization,
    /// Illegal lifecycle transition, frozen agent, pause policy, re-entry.
    State,
    /// Withdrawal exceeds the balance.
    InsufficientBalance,
    /// The external value transfer failed.
    PayoutFailure,
    /// The agent's logic capability refused the action.
    Action,
    /// Persisting registry state failed.
    Storage,
}

impl ErrorKind {
    /// Stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Authorization => "authorization",
            Self::State => "state",
            Self::InsufficientBalance => "insufficient_balance",
            Self::PayoutFailure => "payout_failure",
            Self::Action => "action",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// REGISTRY ERRORS
// =============================================================================

/// Errors returned by registry operations.
#[derive(Debug, Error, Clone)]
pub enum RegistryError {
    /// Malformed input (null references, overflowing amounts, bad config).
    #[error("{reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },

    /// The agent id was never allocated.
    #[error("agent {id} does not exist")]
    AgentNotFound {
        /// Requested id.
        id: AgentId,
    },

    /// Owner-gated operation attempted by someone else.
    #[error("caller is not agent owner")]
    NotAgentOwner {
        /// Rejected caller.
        caller: Address,
        /// Attempted operation.
        operation: Operation,
    },

    /// Governance-gated operation attempted by someone else.
    #[error("caller is not governance")]
    NotGovernance {
        /// Rejected caller.
        caller: Address,
        /// Attempted operation.
        operation: Operation,
    },

    /// Ownership sync presented a capability from another registry, or none.
    #[error("caller is not the ownership transfer authority")]
    InvalidTransferAuthority,

    /// The lifecycle state machine refused the transition.
    #[error("invalid transition: cannot {action} agent {id} while {from}")]
    InvalidTransition {
        /// Target agent.
        id: AgentId,
        /// Current status.
        from: AgentStatus,
        /// Attempted action.
        action: LifecycleAction,
    },

    /// The agent is Terminated and the operation mutates it.
    #[error("agent {id} is terminated: {operation} rejected")]
    AgentTerminated {
        /// Target agent.
        id: AgentId,
        /// Attempted operation.
        operation: Operation,
    },

    /// The operation needs an Active agent.
    #[error("agent {id} is {status}, not active")]
    AgentNotActive {
        /// Target agent.
        id: AgentId,
        /// Current status.
        status: AgentStatus,
    },

    /// Disabled by the global pause policy.
    #[error("registry is globally paused: {operation} disabled")]
    GloballyPaused {
        /// Attempted operation.
        operation: Operation,
    },

    /// A withdrawal for this agent has not settled yet.
    #[error("agent {id} has a withdrawal in flight: {operation} rejected")]
    Reentrant {
        /// Target agent.
        id: AgentId,
        /// Attempted operation.
        operation: Operation,
    },

    /// Withdrawal larger than the balance.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount asked for.
        requested: U256,
        /// Amount held.
        available: U256,
    },

    /// The payout collaborator failed; the withdrawal was rolled back.
    #[error("payout failed: {0}")]
    PayoutFailed(#[from] PayoutError),

    /// The logic capability failed.
    #[error("action failed: {0}")]
    ActionFailed(#[from] LogicError),

    /// Persisting state failed; nothing was committed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl RegistryError {
    /// Shorthand for [`RegistryError::InvalidInput`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Stable classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::Validation,
            Self::AgentNotFound { .. } => ErrorKind::NotFound,
            Self::NotAgentOwner { .. }
            | Self::NotGovernance { .. }
            | Self::InvalidTransferAuthority => ErrorKind::Authorization,
            Self::InvalidTransition { .. }
            | Self::AgentTerminated { .. }
            | Self::AgentNotActive { .. }
            | Self::GloballyPaused { .. }
            | Self::Reentrant { .. } => ErrorKind::State,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::PayoutFailed(_) => ErrorKind::PayoutFailure,
            Self::ActionFailed(_) => ErrorKind::Action,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<LedgerError> for RegistryError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Insufficient {
                requested,
                available,
            } => Self::InsufficientBalance {
                requested,
                available,
            },
            LedgerError::Overflow => Self::invalid("amount overflows the ledger"),
        }
    }
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from the persistence collaborator.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error on {}: {message}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },

    /// Another process holds the data directory.
    #[error("data directory already in use: {}", path.display())]
    Locked {
        /// Lock file path.
        path: PathBuf,
    },

    /// Encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The snapshot header is not ours or the body is damaged.
    #[error("snapshot corrupted: {0}")]
    Corrupted(String),

    /// The snapshot was written by an unknown schema version.
    #[error("unsupported schema version {found} (supported up to {supported})")]
    UnsupportedVersion {
        /// Version found on disk.
        found: u32,
        /// Newest version this build reads.
        supported: u32,
    },

    /// The backend refused the write.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// PAYOUT ERRORS
// =============================================================================

/// Errors from the external value-transfer collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayoutError {
    /// The recipient refused or could not receive the value.
    #[error("recipient {recipient:?} rejected transfer: {reason}")]
    Rejected {
        /// Intended recipient.
        recipient: Address,
        /// Reason reported by the transfer mechanism.
        reason: String,
    },

    /// The transfer mechanism is not reachable.
    #[error("payout gateway unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// LOGIC ERRORS
// =============================================================================

/// Errors from an agent logic capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogicError {
    /// The payload is not understood by this logic.
    #[error("invalid action payload: {0}")]
    InvalidPayload(String),

    /// The logic declined to act.
    #[error("action rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// TESTS
// =============================================================================
