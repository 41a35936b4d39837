//! # Logic Directory
//!
//! Static map from logic references to [`AgentLogic`] capabilities, plus two
//! small capabilities used by tests and demos.

use crate::domain::value_objects::Address;
use crate::errors::LogicError;
use crate::ports::outbound::{ActionContext, AgentLogic, LogicDirectory};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Directory populated up front by whoever wires the registry.
#[derive(Default)]
pub struct StaticLogicDirectory {
    entries: RwLock<HashMap<Address, Arc<dyn AgentLogic>>>,
}

impl StaticLogicDirectory {
    /// Empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `logic` under `address`, replacing any previous entry.
    pub fn register(&self, address: Address, logic: Arc<dyn AgentLogic>) {
        self.entries.write().insert(address, logic);
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(self, address: Address, logic: Arc<dyn AgentLogic>) -> Self {
        self.register(address, logic);
        self
    }
}

impl LogicDirectory for StaticLogicDirectory {
    fn resolve(&self, logic: Address) -> Option<Arc<dyn AgentLogic>> {
        self.entries.read().get(&logic).cloned()
    }
}

/// Returns the payload unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoLogic;

impl AgentLogic for EchoLogic {
    fn handle_action(&self, _context: &ActionContext, payload: &[u8]) -> Result<Vec<u8>, LogicError> {
        Ok(payload.to_vec())
    }
}

/// Refuses every action.
#[derive(Debug, Clone)]
pub struct RejectingLogic {
    reason: String,
}

impl RejectingLogic {
    /// Capability that rejects with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AgentLogic for RejectingLogic {
    fn handle_action(&self, _context: &ActionContext, _payload: &[u8]) -> Result<Vec<u8>, LogicError> {
        Err(LogicError::Rejected(self.reason.clone()))
    }
}
