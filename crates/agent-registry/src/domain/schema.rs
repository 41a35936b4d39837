//! # Snapshot Schema
//!
//! Version history of the persisted [`RegistryState`].
//!
//! | Version | Changes |
//! |---------|---------|
//! | 1 | Agents with persona/memory/voice/animation metadata, governance, global pause |
//! | 2 | Adds vault URI and vault hash, the module registry reference and ledger totals |
//!
//! Older snapshots are upgraded in memory by [`migrate_v1_to_v2`]; the caller is
//! expected to write the upgraded state back.

use crate::domain::entities::{AgentRecord, RegistrySettings, RegistryState};
use crate::domain::ledger::LedgerTotals;
use crate::domain::lifecycle::AgentStatus;
use crate::domain::metadata::AgentMetadata;
use crate::domain::value_objects::{Address, AgentId, Hash, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 2;

/// Oldest schema version this build can read.
pub const MIN_SUPPORTED_VERSION: u32 = 1;

/// Version 1 snapshot body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotV1 {
    /// Governance principal.
    pub governance: Address,
    /// Global pause flag.
    pub global_pause: bool,
    /// Next id to allocate.
    pub next_id: u64,
    /// All records.
    pub agents: BTreeMap<AgentId, AgentRecordV1>,
}

/// Version 1 agent record: metadata had no vault fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct AgentRecordV1 {
    pub id: AgentId,
    pub owner: Address,
    pub logic: Address,
    pub status: AgentStatus,
    pub balance: U256,
    pub persona: String,
    pub memory: String,
    pub voice_hash: String,
    pub animation_uri: String,
    pub metadata_uri: String,
}

/// Upgrades a version 1 snapshot.
///
/// Vault fields start empty and the module registry unset. Version 1 kept no
/// flow totals, so the current holdings are taken as everything deposited.
///
/// # Errors
///
/// Returns a description if the balances overflow when summed.
pub fn migrate_v1_to_v2(v1: SnapshotV1) -> Result<RegistryState, String> {
    let deposited = v1
        .agents
        .values()
        .try_fold(U256::zero(), |sum, record| sum.checked_add(record.balance))
        .ok_or_else(|| "v1 balances overflow".to_string())?;

    let agents = v1
        .agents
        .into_iter()
        .map(|(id, old)| {
            let record = AgentRecord {
                id: old.id,
                owner: old.owner,
                logic: old.logic,
                status: old.status,
                balance: old.balance,
                metadata: AgentMetadata {
                    persona: old.persona,
                    memory: old.memory,
                    voice_hash: old.voice_hash,
                    animation_uri: old.animation_uri,
                    vault_uri: String::new(),
                    vault_hash: Hash::ZERO,
                },
                metadata_uri: old.metadata_uri,
            };
            (id, record)
        })
        .collect();

    Ok(RegistryState {
        settings: RegistrySettings {
            governance: v1.governance,
            global_pause: v1.global_pause,
            module_registry: Address::ZERO,
        },
        next_id: v1.next_id,
        totals: LedgerTotals {
            deposited,
            withdrawn: U256::zero(),
        },
        agents,
    })
}
