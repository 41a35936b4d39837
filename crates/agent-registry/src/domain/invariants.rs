//! # Domain Invariants
//!
//! Properties that must hold for every committed registry state. The service
//! audits them when a snapshot is loaded and exposes the audit for tests and
//! operators.
//!
//! - Ids are unique, keyed consistently and below `next_id`.
//! - Every record has a non-null logic reference.
//! - The sum of balances equals total deposits minus total withdrawals.

use crate::domain::entities::RegistryState;
use crate::domain::value_objects::{AgentId, U256};
use std::fmt;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Every record is stored under its own id, and that id was allocated.
#[must_use]
pub fn check_id_invariant(state: &RegistryState) -> Vec<InvariantViolation> {
    state
        .agents
        .iter()
        .filter_map(|(key, record)| {
            if *key != record.id {
                Some(InvariantViolation::MisfiledRecord {
                    key: *key,
                    id: record.id,
                })
            } else if record.id.get() == 0 || record.id.get() >= state.next_id {
                Some(InvariantViolation::UnallocatedId {
                    id: record.id,
                    next_id: state.next_id,
                })
            } else {
                None
            }
        })
        .collect()
}

/// No record points at the null logic reference.
#[must_use]
pub fn check_logic_invariant(state: &RegistryState) -> Vec<InvariantViolation> {
    state
        .agents
        .values()
        .filter(|record| record.logic.is_zero())
        .map(|record| InvariantViolation::NullLogic { id: record.id })
        .collect()
}

/// Value is neither created nor destroyed inside the ledger.
#[must_use]
pub fn check_conservation_invariant(state: &RegistryState) -> Option<InvariantViolation> {
    let held = state.total_balance();
    let expected = state.totals.expected_holdings();
    match (held, expected) {
        (Some(held), Some(expected)) if held == expected => None,
        _ => Some(InvariantViolation::ValueNotConserved {
            held,
            deposited: state.totals.deposited,
            withdrawn: state.totals.withdrawn,
        }),
    }
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(state: &RegistryState) -> InvariantCheckResult {
    let mut violations = check_id_invariant(state);
    violations.extend(check_logic_invariant(state));
    violations.extend(check_conservation_invariant(state));

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The violations found, if any.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(violations) => violations,
        }
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Map key and record id disagree.
    MisfiledRecord {
        /// Key the record is stored under.
        key: AgentId,
        /// Id the record carries.
        id: AgentId,
    },
    /// Record id was never handed out by the allocator.
    UnallocatedId {
        /// Offending record id.
        id: AgentId,
        /// Allocator position at audit time.
        next_id: u64,
    },
    /// Record with a null logic reference.
    NullLogic {
        /// Offending record id.
        id: AgentId,
    },
    /// Balances do not add up to the recorded flow.
    ValueNotConserved {
        /// Sum of all balances; `None` if the sum overflowed.
        held: Option<U256>,
        /// Recorded deposits.
        deposited: U256,
        /// Recorded withdrawals.
        withdrawn: U256,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MisfiledRecord { key, id } => {
                write!(f, "record {id} stored under key {key}")
            }
            Self::UnallocatedId { id, next_id } => {
                write!(f, "record {id} not below next id {next_id}")
            }
            Self::NullLogic { id } => write!(f, "agent {id} has a null logic reference"),
            Self::ValueNotConserved {
                held,
                deposited,
                withdrawn,
            } => match held {
                Some(held) => write!(
                    f,
                    "balances sum to {held}, expected {deposited} - {withdrawn}"
                ),
                None => write!(f, "balances overflow"),
            },
        }
    }
}
