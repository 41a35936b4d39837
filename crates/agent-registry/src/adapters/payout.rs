//! # Payout Adapter
//!
//! In-memory value transfer for testing. Tracks what each recipient received
//! and can be told to refuse specific recipients or fail the next call.

use crate::domain::value_objects::{Address, U256};
use crate::errors::PayoutError;
use crate::ports::outbound::PayoutGateway;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory payout ledger.
#[derive(Debug, Default)]
pub struct InMemoryPayouts {
    received: RwLock<HashMap<Address, U256>>,
    rejecting: RwLock<HashSet<Address>>,
    fail_next: AtomicBool,
}

impl InMemoryPayouts {
    /// Create a new payout ledger with nothing paid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total paid to `recipient` so far.
    pub fn received(&self, recipient: Address) -> U256 {
        self.received
            .read()
            .get(&recipient)
            .copied()
            .unwrap_or_default()
    }

    /// Make every payout to `recipient` fail.
    pub fn reject_recipient(&self, recipient: Address) {
        self.rejecting.write().insert(recipient);
    }

    /// Accept payouts to `recipient` again.
    pub fn accept_recipient(&self, recipient: Address) {
        self.rejecting.write().remove(&recipient);
    }

    /// Make the next payout fail as if the gateway were down.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PayoutGateway for InMemoryPayouts {
    async fn pay(&self, recipient: Address, amount: U256) -> Result<(), PayoutError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PayoutError::Unavailable("gateway offline".to_string()));
        }
        if self.rejecting.read().contains(&recipient) {
            return Err(PayoutError::Rejected {
                recipient,
                reason: "recipient refuses transfers".to_string(),
            });
        }

        let mut received = self.received.write();
        let entry = received.entry(recipient).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| PayoutError::Rejected {
                recipient,
                reason: "recipient balance overflow".to_string(),
            })?;
        Ok(())
    }
}
