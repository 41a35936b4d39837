//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports, plus the in-process
//! ownership transfer mechanism.
//!
//! | Adapter | Port | Use |
//! |---------|------|-----|
//! | `InMemoryStore` | `RegistryStore` | tests |
//! | `FileSnapshotStore` | `RegistryStore` | durable deployments |
//! | `InMemoryPayouts` | `PayoutGateway` | tests and demos |
//! | `StaticLogicDirectory` | `LogicDirectory` | wiring-time registration |
//! | `OwnershipTransfers` | calls `OwnershipSync` | transfer mechanism |

pub mod codec;
pub mod file_store;
pub mod logic_directory;
pub mod memory_store;
pub mod ownership;
pub mod payout;

pub use file_store::FileSnapshotStore;
pub use logic_directory::{EchoLogic, RejectingLogic, StaticLogicDirectory};
pub use memory_store::InMemoryStore;
pub use ownership::OwnershipTransfers;
pub use payout::InMemoryPayouts;
