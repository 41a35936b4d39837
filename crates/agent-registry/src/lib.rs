//! # Agent Registry - Identity, Lifecycle and Value Ledger
//!
//! ## Purpose
//!
//! Maintains a durable registry of autonomous agent identities. Each agent
//! has an owner, a delegated logic reference, descriptive metadata, a
//! lifecycle status and a balance of custodied value. Mutations are gated by
//! ownership or by a single governance principal.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Ids allocated from 1, strictly increasing, never reused | `domain/entities.rs` - `allocate_id()` |
//! | Logic reference never zero | `service.rs` - create / `set_logic_address` |
//! | Terminated is absorbing | `domain/lifecycle.rs` - `AgentStatus::apply()` |
//! | Value held equals deposits minus withdrawals | `domain/invariants.rs` - `check_conservation_invariant()` |
//! | No partial mutation on failure | `service.rs` - `commit()` checkpoint |
//! | Debit committed before payout | `service.rs` - `withdraw_inner()` |
//!
//! ## Authorization Matrix
//!
//! | Operation | Permitted Caller |
//! |-----------|------------------|
//! | `create_agent`, `fund`, reads | anyone |
//! | metadata, logic, lifecycle, `withdraw`, `execute_action` | agent owner |
//! | `set_governance`, `set_global_pause`, `set_module_registry` | governance |
//! | `on_ownership_transferred` | holder of the [`TransferAuthority`](ports::TransferAuthority) |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Persistence | `RegistryStore` | Atomic snapshot of the whole registry |
//! | Value transfer | `PayoutGateway` | Deliver withdrawn value to the owner |
//! | Agent behavior | `LogicDirectory` | Resolve logic references for `execute_action` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use agent_registry::prelude::*;
//!
//! let registry = create_test_service(governance)?;
//! let id = registry
//!     .create_agent(owner, CreateAgentRequest::new(owner, logic, "ipfs://agent"))
//!     .await?;
//! registry.fund(sponsor, id, U256::from(1_000)).await?;
//! registry.withdraw(owner, id, U256::from(400)).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

mod telemetry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{AgentRecord, AgentState, RegistrySettings, RegistryState};
    pub use crate::domain::lifecycle::{AgentStatus, LifecycleAction};
    pub use crate::domain::metadata::AgentMetadata;

    // Value objects
    pub use crate::domain::value_objects::{Address, AgentId, Hash, U256};

    // Authorization
    pub use crate::domain::authorization::{Operation, PausePolicy, TerminationPolicy};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{
        AgentRegistryApi, CreateAgentRequest, OwnershipSync, TransferAuthority,
    };
    pub use crate::ports::outbound::{
        ActionContext, AgentLogic, LoadedState, LogicDirectory, PayoutGateway, RegistryStore,
    };

    // Events
    pub use crate::events::{EventRecord, RegistryEvent};

    // Errors
    pub use crate::errors::{ErrorKind, LogicError, PayoutError, RegistryError, StoreError};

    // Configuration
    pub use crate::config::{
        ConfigError, RegistryConfig, DEFAULT_COLLECTION_NAME, DEFAULT_COLLECTION_SYMBOL,
    };

    // Adapters
    pub use crate::adapters::{
        EchoLogic, FileSnapshotStore, InMemoryPayouts, InMemoryStore, OwnershipTransfers,
        RejectingLogic, StaticLogicDirectory,
    };

    // Service
    pub use crate::service::{
        create_test_service, AgentRegistryService, ServiceStats, TestRegistryService,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
