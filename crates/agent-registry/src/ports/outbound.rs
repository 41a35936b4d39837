//! # Driven Ports (SPI - Outbound)
//!
//! Collaborators the registry depends on:
//! - [`RegistryStore`]: durable snapshot of the registry state
//! - [`PayoutGateway`]: the external value transfer used by `withdraw`
//! - [`LogicDirectory`] / [`AgentLogic`]: the delegated behavior behind a logic reference

use crate::domain::entities::RegistryState;
use crate::domain::value_objects::{Address, AgentId, U256};
use crate::errors::{LogicError, PayoutError, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

// =============================================================================
// PERSISTENCE
// =============================================================================

/// State read back from a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedState {
    /// The state, already in the current schema.
    pub state: RegistryState,
    /// Schema version the snapshot was written with, when older than current.
    pub upgraded_from: Option<u32>,
}

/// Durable storage for the registry state.
///
/// The registry persists the whole state after every mutation and only
/// publishes the mutation once `persist` returns Ok.
pub trait RegistryStore: Send + Sync {
    /// Reads the last persisted state, or None for a fresh store.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the snapshot is unreadable or of an unknown version.
    fn load(&self) -> Result<Option<LoadedState>, StoreError>;

    /// Replaces the persisted state.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the write did not complete; the old state stays.
    fn persist(&self, state: &RegistryState) -> Result<(), StoreError>;
}

// =============================================================================
// PAYOUT
// =============================================================================

/// External value transfer.
///
/// The registry calls this without holding its state lock, so an
/// implementation may call back into the registry.
#[async_trait]
pub trait PayoutGateway: Send + Sync {
    /// Sends `amount` to `recipient`.
    async fn pay(&self, recipient: Address, amount: U256) -> Result<(), PayoutError>;
}

// =============================================================================
// AGENT LOGIC
// =============================================================================

/// Read-only view handed to an [`AgentLogic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionContext {
    /// Agent the action runs for.
    pub agent_id: AgentId,
    /// Current owner (the caller).
    pub owner: Address,
    /// Balance at the time of the call.
    pub balance: U256,
}

/// Delegated behavior of an agent.
///
/// The registry only ever calls `handle_action`. The capability has no handle
/// to the registry and cannot move value.
pub trait AgentLogic: Send + Sync {
    /// Handles one action payload and returns its output.
    ///
    /// # Errors
    ///
    /// [`LogicError`] if the payload is rejected.
    fn handle_action(&self, context: &ActionContext, payload: &[u8]) -> Result<Vec<u8>, LogicError>;
}

/// Resolves logic references to capabilities.
pub trait LogicDirectory: Send + Sync {
    /// The capability registered under `logic`, if any.
    fn resolve(&self, logic: Address) -> Option<Arc<dyn AgentLogic>>;
}
