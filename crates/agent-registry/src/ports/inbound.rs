//! # Driving Ports (API - Inbound)
//!
//! The operations the registry exposes. Every mutating operation takes the
//! caller's principal explicitly; the authorization gate resolves it against
//! the agent owner or the governance principal.
//!
//! Ownership sync is deliberately split out into [`OwnershipSync`]: it is
//! callable only with the [`TransferAuthority`] capability that the registry
//! hands out exactly once.

use crate::domain::entities::AgentState;
use crate::domain::metadata::AgentMetadata;
use crate::domain::value_objects::{Address, AgentId, U256};
use crate::errors::RegistryError;
use crate::events::EventRecord;
use async_trait::async_trait;
use uuid::Uuid;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Arguments for [`AgentRegistryApi::create_agent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateAgentRequest {
    /// Initial owner. Must not be the zero address.
    pub owner: Address,
    /// Logic reference. Must not be the zero address.
    pub logic: Address,
    /// Pointer to the external descriptive document.
    pub metadata_uri: String,
    /// Extended metadata; all fields empty when None.
    pub metadata: Option<AgentMetadata>,
}

impl CreateAgentRequest {
    /// Request without extended metadata.
    pub fn new(owner: Address, logic: Address, metadata_uri: impl Into<String>) -> Self {
        Self {
            owner,
            logic,
            metadata_uri: metadata_uri.into(),
            metadata: None,
        }
    }

    /// Attaches extended metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: AgentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// =============================================================================
// AGENT REGISTRY API (Primary Driving Port)
// =============================================================================

/// Primary API of the agent registry.
///
/// Each operation either commits fully (state persisted, one event appended)
/// or fails with no observable effect.
#[async_trait]
pub trait AgentRegistryApi: Send + Sync {
    // --- identity ---------------------------------------------------------

    /// Allocates the next id. Open to any caller.
    async fn create_agent(
        &self,
        caller: Address,
        request: CreateAgentRequest,
    ) -> Result<AgentId, RegistryError>;

    /// Owner, logic, status and balance of `id`.
    async fn get_state(&self, id: AgentId) -> Result<AgentState, RegistryError>;

    /// Extended metadata of `id`.
    async fn get_metadata(&self, id: AgentId) -> Result<AgentMetadata, RegistryError>;

    /// Metadata URI of `id`.
    async fn get_metadata_uri(&self, id: AgentId) -> Result<String, RegistryError>;

    /// Replaces the logic reference. Owner-only; rejects the zero address.
    async fn set_logic_address(
        &self,
        caller: Address,
        id: AgentId,
        logic: Address,
    ) -> Result<(), RegistryError>;

    /// Replaces the extended metadata. Owner-only.
    async fn update_metadata(
        &self,
        caller: Address,
        id: AgentId,
        metadata: AgentMetadata,
    ) -> Result<(), RegistryError>;

    /// Replaces the metadata URI. Owner-only.
    async fn set_metadata_uri(
        &self,
        caller: Address,
        id: AgentId,
        uri: String,
    ) -> Result<(), RegistryError>;

    // --- lifecycle --------------------------------------------------------

    /// Active → Paused. Owner-only.
    async fn pause(&self, caller: Address, id: AgentId) -> Result<(), RegistryError>;

    /// Paused → Active. Owner-only.
    async fn unpause(&self, caller: Address, id: AgentId) -> Result<(), RegistryError>;

    /// Active | Paused → Terminated. Owner-only.
    async fn terminate(&self, caller: Address, id: AgentId) -> Result<(), RegistryError>;

    // --- ledger -----------------------------------------------------------

    /// Credits `amount` to `id`. Open to any caller; zero is accepted.
    async fn fund(&self, caller: Address, id: AgentId, amount: U256)
        -> Result<(), RegistryError>;

    /// Debits `amount` and pays it to the owner. Owner-only.
    ///
    /// The debit is committed before the payout; a failed payout reverses it.
    async fn withdraw(
        &self,
        caller: Address,
        id: AgentId,
        amount: U256,
    ) -> Result<(), RegistryError>;

    /// Hands `payload` to the agent's logic capability. Owner-only; the agent
    /// must be Active.
    async fn execute_action(
        &self,
        caller: Address,
        id: AgentId,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, RegistryError>;

    // --- governance -------------------------------------------------------

    /// Current governance principal.
    async fn governance(&self) -> Address;

    /// Replaces the governance principal. Governance-only; rejects zero.
    async fn set_governance(&self, caller: Address, new: Address) -> Result<(), RegistryError>;

    /// Current global pause flag.
    async fn global_pause(&self) -> bool;

    /// Writes the global pause flag. Governance-only.
    async fn set_global_pause(&self, caller: Address, value: bool) -> Result<(), RegistryError>;

    /// Module registry reference, if set.
    async fn module_registry(&self) -> Option<Address>;

    /// Replaces the module registry reference. Governance-only.
    async fn set_module_registry(
        &self,
        caller: Address,
        registry: Address,
    ) -> Result<(), RegistryError>;

    // --- queries ----------------------------------------------------------

    /// The id the next successful `create_agent` will return.
    async fn next_agent_id(&self) -> AgentId;

    /// Number of agents ever created.
    async fn agent_count(&self) -> usize;

    /// Ids currently owned by `owner`, ascending.
    async fn agents_of(&self, owner: Address) -> Vec<AgentId>;

    /// Events with a sequence number greater than `after`.
    async fn events_since(&self, after: u64) -> Vec<EventRecord>;
}

// =============================================================================
// OWNERSHIP SYNC
// =============================================================================

/// Capability to synchronize owners after external transfers.
///
/// Issued once per registry instance and bound to it; a capability from
/// another registry is rejected.
#[derive(Debug)]
pub struct TransferAuthority {
    registry: Uuid,
}

impl TransferAuthority {
    pub(crate) fn new(registry: Uuid) -> Self {
        Self { registry }
    }

    /// Instance id of the registry that issued this capability.
    #[must_use]
    pub fn registry(&self) -> Uuid {
        self.registry
    }
}

/// Hook invoked by the ownership transfer mechanism.
#[async_trait]
pub trait OwnershipSync: Send + Sync {
    /// Moves `id` from `previous` to `new_owner`.
    ///
    /// Compare-and-set on the owner: fails if `previous` is not the current
    /// owner. Accepted for Terminated agents.
    async fn on_ownership_transferred(
        &self,
        authority: &TransferAuthority,
        id: AgentId,
        previous: Address,
        new_owner: Address,
    ) -> Result<(), RegistryError>;
}
