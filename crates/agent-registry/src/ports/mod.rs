//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `AgentRegistryApi`, `OwnershipSync`
//! - **Driven Ports (Outbound)**: `RegistryStore`, `PayoutGateway`, `LogicDirectory`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
