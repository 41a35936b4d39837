//! Snapshot codec.
//!
//! Layout: `[magic: 4 bytes "AGRG"][schema version: u32 LE][bincode body]`.

use crate::domain::entities::RegistryState;
use crate::domain::schema::{migrate_v1_to_v2, SnapshotV1, MIN_SUPPORTED_VERSION, SCHEMA_VERSION};
use crate::errors::StoreError;
use crate::ports::outbound::LoadedState;

/// File magic.
pub const MAGIC: [u8; 4] = *b"AGRG";

const HEADER_LEN: usize = 8;

/// Encodes `state` with the current schema version.
///
/// # Errors
///
/// [`StoreError::Serialization`] if bincode fails.
pub fn encode_snapshot(state: &RegistryState) -> Result<Vec<u8>, StoreError> {
    let body = bincode::serialize(state).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(frame(SCHEMA_VERSION, body))
}

/// Encodes a version 1 snapshot. Used to exercise the upgrade path.
///
/// # Errors
///
/// [`StoreError::Serialization`] if bincode fails.
pub fn encode_v1_snapshot(snapshot: &SnapshotV1) -> Result<Vec<u8>, StoreError> {
    let body =
        bincode::serialize(snapshot).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(frame(MIN_SUPPORTED_VERSION, body))
}

fn frame(version: u32, body: Vec<u8>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&version.to_le_bytes());
    bytes.extend_from_slice(&body);
    bytes
}

/// Decodes a snapshot of any supported version into the current schema.
///
/// # Errors
///
/// - [`StoreError::Corrupted`] for a bad header or undecodable body
/// - [`StoreError::UnsupportedVersion`] for versions outside the supported range
pub fn decode_snapshot(bytes: &[u8]) -> Result<LoadedState, StoreError> {
    if bytes.len() < HEADER_LEN || bytes[..4] != MAGIC {
        return Err(StoreError::Corrupted("missing snapshot header".to_string()));
    }
    let mut version_bytes = [0u8; 4];
    version_bytes.copy_from_slice(&bytes[4..HEADER_LEN]);
    let version = u32::from_le_bytes(version_bytes);
    let body = &bytes[HEADER_LEN..];

    match version {
        SCHEMA_VERSION => {
            let state: RegistryState =
                bincode::deserialize(body).map_err(|e| StoreError::Corrupted(e.to_string()))?;
            Ok(LoadedState {
                state,
                upgraded_from: None,
            })
        }
        MIN_SUPPORTED_VERSION => {
            let v1: SnapshotV1 =
                bincode::deserialize(body).map_err(|e| StoreError::Corrupted(e.to_string()))?;
            let state = migrate_v1_to_v2(v1).map_err(StoreError::Corrupted)?;
            Ok(LoadedState {
                state,
                upgraded_from: Some(version),
            })
        }
        found => Err(StoreError::UnsupportedVersion {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}
