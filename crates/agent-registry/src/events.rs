//! # Registry Events
//!
//! Every committed mutation emits exactly one [`RegistryEvent`]. Events are
//! appended to an in-memory [`EventLog`] with a strictly increasing sequence
//! number, so observers can poll with [`EventLog::since`].
//!
//! Events are emitted only after the mutation is persisted; a failed operation
//! leaves no event behind.

use crate::domain::lifecycle::AgentStatus;
use crate::domain::value_objects::{Address, AgentId, U256};
use serde::{Deserialize, Serialize};

/// Notification of a committed registry change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A new agent was allocated.
    Created {
        /// New id.
        id: AgentId,
        /// Initial owner.
        owner: Address,
        /// Initial logic reference.
        logic: Address,
    },
    /// Lifecycle transition.
    StatusChanged {
        /// Agent.
        id: AgentId,
        /// Previous status.
        from: AgentStatus,
        /// New status.
        to: AgentStatus,
    },
    /// Value deposited.
    Funded {
        /// Agent.
        id: AgentId,
        /// Amount credited.
        amount: U256,
    },
    /// Value paid out to the owner.
    Withdrawn {
        /// Agent.
        id: AgentId,
        /// Amount debited.
        amount: U256,
    },
    /// Extended metadata or the metadata URI changed.
    MetadataUpdated {
        /// Agent.
        id: AgentId,
    },
    /// Logic reference replaced.
    LogicUpdated {
        /// Agent.
        id: AgentId,
        /// Previous reference.
        old: Address,
        /// New reference.
        new: Address,
    },
    /// Governance principal replaced.
    GovernanceChanged {
        /// Previous principal.
        old: Address,
        /// New principal.
        new: Address,
    },
    /// Global pause flag written.
    GlobalPauseChanged {
        /// New flag value.
        value: bool,
    },
    /// Module registry reference replaced.
    ModuleRegistryChanged {
        /// Previous reference.
        old: Address,
        /// New reference.
        new: Address,
    },
    /// Owner synchronized after an external transfer.
    OwnerChanged {
        /// Agent.
        id: AgentId,
        /// Previous owner.
        previous: Address,
        /// New owner.
        new: Address,
    },
    /// The agent's logic capability handled an action.
    ActionExecuted {
        /// Agent.
        id: AgentId,
        /// Logic reference that handled it.
        logic: Address,
    },
}

impl RegistryEvent {
    /// Stable event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::StatusChanged { .. } => "status_changed",
            Self::Funded { .. } => "funded",
            Self::Withdrawn { .. } => "withdrawn",
            Self::MetadataUpdated { .. } => "metadata_updated",
            Self::LogicUpdated { .. } => "logic_updated",
            Self::GovernanceChanged { .. } => "governance_changed",
            Self::GlobalPauseChanged { .. } => "global_pause_changed",
            Self::ModuleRegistryChanged { .. } => "module_registry_changed",
            Self::OwnerChanged { .. } => "owner_changed",
            Self::ActionExecuted { .. } => "action_executed",
        }
    }

    /// The agent this event concerns, if any.
    #[must_use]
    pub const fn agent(&self) -> Option<AgentId> {
        match self {
            Self::Created { id, .. }
            | Self::StatusChanged { id, .. }
            | Self::Funded { id, .. }
            | Self::Withdrawn { id, .. }
            | Self::MetadataUpdated { id }
            | Self::LogicUpdated { id, .. }
            | Self::OwnerChanged { id, .. }
            | Self::ActionExecuted { id, .. } => Some(*id),
            Self::GovernanceChanged { .. }
            | Self::GlobalPauseChanged { .. }
            | Self::ModuleRegistryChanged { .. } => None,
        }
    }
}

/// An event together with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 1.
    pub sequence: u64,
    /// The event.
    pub event: RegistryEvent,
}

/// Append-only, in-memory event log.
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` and returns its sequence number.
    pub fn push(&mut self, event: RegistryEvent) -> u64 {
        let sequence = self.last_sequence() + 1;
        tracing::debug!(sequence, event = event.name(), "event recorded");
        self.records.push(EventRecord { sequence, event });
        sequence
    }

    /// Sequence number of the newest record, or 0 when empty.
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.records.last().map_or(0, |record| record.sequence)
    }

    /// Records with a sequence number greater than `after`.
    #[must_use]
    pub fn since(&self, after: u64) -> Vec<EventRecord> {
        // sequence n lives at index n - 1
        let start = usize::try_from(after).unwrap_or(usize::MAX).min(self.records.len());
        self.records[start..].to_vec()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
