//! # Integration Tests
//!
//! Multi-step scenarios driven only through the public API and adapters.

pub mod flows;
pub mod persistence;
