//! # Exploit Simulations
//!
//! Attacks against the registry's ledger and authorization gate. Each test
//! plays the attacker and asserts the registry state is unchanged by the
//! attempt.

pub mod authorization;
