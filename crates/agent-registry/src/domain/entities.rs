//! # Core Domain Entities
//!
//! The agent record, the registry-wide settings and the complete registry
//! state that is persisted as one unit.

use crate::domain::ledger::LedgerTotals;
use crate::domain::lifecycle::AgentStatus;
use crate::domain::metadata::AgentMetadata;
use crate::domain::value_objects::{Address, AgentId, U256};
use crate::errors::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// AGENT RECORD
// =============================================================================

/// One agent identity. Never deleted; Terminated is its tombstone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Unique identifier.
    pub id: AgentId,
    /// Current holder; mirrors the external transfer mechanism.
    pub owner: Address,
    /// Delegated behavior reference. Never zero.
    pub logic: Address,
    /// Lifecycle status.
    pub status: AgentStatus,
    /// Value held for this agent, in the smallest currency unit.
    pub balance: U256,
    /// Extended metadata.
    pub metadata: AgentMetadata,
    /// Pointer to the external descriptive document.
    pub metadata_uri: String,
}

impl AgentRecord {
    /// Creates a fresh Active record with a zero balance.
    #[must_use]
    pub fn new(
        id: AgentId,
        owner: Address,
        logic: Address,
        metadata_uri: String,
        metadata: AgentMetadata,
    ) -> Self {
        Self {
            id,
            owner,
            logic,
            status: AgentStatus::Active,
            balance: U256::zero(),
            metadata,
            metadata_uri,
        }
    }

    /// Read view of the record.
    #[must_use]
    pub fn state(&self) -> AgentState {
        AgentState {
            owner: self.owner,
            logic: self.logic,
            status: self.status,
            balance: self.balance,
        }
    }
}

/// Read view returned by `get_state`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentState {
    /// Current owner.
    pub owner: Address,
    /// Logic reference.
    pub logic: Address,
    /// Lifecycle status.
    pub status: AgentStatus,
    /// Current balance.
    pub balance: U256,
}

// =============================================================================
// REGISTRY SETTINGS
// =============================================================================

/// Registry-wide singletons, mutable only by governance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// The single privileged principal.
    pub governance: Address,
    /// Registry-wide pause flag.
    pub global_pause: bool,
    /// Opaque reference to the external module registry (zero when unset).
    pub module_registry: Address,
}

impl RegistrySettings {
    /// Settings for a brand-new registry.
    #[must_use]
    pub fn new(governance: Address) -> Self {
        Self {
            governance,
            global_pause: false,
            module_registry: Address::ZERO,
        }
    }
}

// =============================================================================
// REGISTRY STATE
// =============================================================================

/// Everything the registry persists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Registry-wide singletons.
    pub settings: RegistrySettings,
    /// Next id to allocate. Starts at 1 and only grows.
    pub next_id: u64,
    /// Aggregate deposits / withdrawals for the conservation audit.
    pub totals: LedgerTotals,
    /// All records ever created, keyed by id.
    pub agents: BTreeMap<AgentId, AgentRecord>,
}

impl RegistryState {
    /// Empty state governed by `governance`.
    #[must_use]
    pub fn new(governance: Address) -> Self {
        Self {
            settings: RegistrySettings::new(governance),
            next_id: AgentId::FIRST.get(),
            totals: LedgerTotals::default(),
            agents: BTreeMap::new(),
        }
    }

    /// Looks up a record.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AgentNotFound`] if `id` was never allocated.
    pub fn agent(&self, id: AgentId) -> Result<&AgentRecord, RegistryError> {
        self.agents
            .get(&id)
            .ok_or(RegistryError::AgentNotFound { id })
    }

    /// Mutable lookup.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AgentNotFound`] if `id` was never allocated.
    pub fn agent_mut(&mut self, id: AgentId) -> Result<&mut AgentRecord, RegistryError> {
        self.agents
            .get_mut(&id)
            .ok_or(RegistryError::AgentNotFound { id })
    }

    /// The id the next `allocate_id` will hand out.
    #[must_use]
    pub fn peek_next_id(&self) -> AgentId {
        AgentId(self.next_id)
    }

    /// Hands out the next id and advances the counter.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidInput`] once the id space is exhausted.
    pub fn allocate_id(&mut self) -> Result<AgentId, RegistryError> {
        let id = AgentId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| RegistryError::invalid("agent id space exhausted"))?;
        Ok(id)
    }

    /// Ids currently held by `owner`, ascending.
    #[must_use]
    pub fn agents_of(&self, owner: Address) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|record| record.owner == owner)
            .map(|record| record.id)
            .collect()
    }

    /// Sum of every balance, or None on overflow.
    #[must_use]
    pub fn total_balance(&self) -> Option<U256> {
        self.agents
            .values()
            .try_fold(U256::zero(), |sum, record| sum.checked_add(record.balance))
    }
}
