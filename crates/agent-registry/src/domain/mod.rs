//! # Domain Layer (Inner Hexagon)
//!
//! Pure registry rules: identities, lifecycle, ledger arithmetic, metadata,
//! the authorization gate and the persisted schema.
//! NO I/O, NO async.

pub mod authorization;
pub mod entities;
pub mod invariants;
pub mod ledger;
pub mod lifecycle;
pub mod metadata;
pub mod schema;
pub mod value_objects;

pub use authorization::{authorize, Operation, PausePolicy, PermissionClass, TerminationPolicy};
pub use entities::*;
pub use invariants::*;
pub use ledger::{LedgerError, LedgerTotals};
pub use lifecycle::{AgentStatus, InvalidTransition, LifecycleAction};
pub use metadata::AgentMetadata;
pub use schema::{SCHEMA_VERSION, MIN_SUPPORTED_VERSION};
pub use value_objects::*;
