//! # Ownership Transfers
//!
//! In-process stand-in for the external token ledger that decides who holds
//! an agent. Every transfer calls the registry's ownership hook before it
//! returns, so the registry owner is never stale.

use crate::domain::authorization::Operation;
use crate::domain::value_objects::{Address, AgentId};
use crate::errors::RegistryError;
use crate::ports::inbound::{OwnershipSync, TransferAuthority};
use std::sync::Arc;

/// Transfer mechanism bound to one registry.
pub struct OwnershipTransfers<R: OwnershipSync> {
    registry: Arc<R>,
    authority: TransferAuthority,
}

impl<R: OwnershipSync> OwnershipTransfers<R> {
    /// Binds the mechanism to `registry` using its transfer authority.
    pub fn new(registry: Arc<R>, authority: TransferAuthority) -> Self {
        Self {
            registry,
            authority,
        }
    }

    /// Moves `id` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotAgentOwner`] if `caller` is not `from`
    /// - [`RegistryError::InvalidInput`] for a zero recipient, or when `from`
    ///   is not the current owner
    /// - anything the registry hook rejects (in-flight withdrawal, unknown id)
    pub async fn transfer(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        id: AgentId,
    ) -> Result<(), RegistryError> {
        if caller != from || caller.is_zero() {
            return Err(RegistryError::NotAgentOwner {
                caller,
                operation: Operation::SyncOwnership,
            });
        }
        if to.is_zero() {
            return Err(RegistryError::invalid("transfer to the zero address"));
        }
        self.registry
            .on_ownership_transferred(&self.authority, id, from, to)
            .await
    }
}
