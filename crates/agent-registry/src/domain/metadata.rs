//! # Metadata Store
//!
//! Descriptive record attached to each agent. The registry stores these fields
//! verbatim; content validation belongs to whoever reads them.

use crate::domain::value_objects::Hash;
use serde::{Deserialize, Serialize};

/// Extended agent metadata.
///
/// `Default` is the all-empty record used when `create_agent` receives none.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetadata {
    /// Persona description (commonly a JSON document).
    pub persona: String,
    /// Free-form memory summary.
    pub memory: String,
    /// Reference to a voice profile.
    pub voice_hash: String,
    /// URI of an animation asset.
    pub animation_uri: String,
    /// URI of the agent's external vault.
    pub vault_uri: String,
    /// Content hash of the vault.
    pub vault_hash: Hash,
}

impl AgentMetadata {
    /// Returns true when every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
