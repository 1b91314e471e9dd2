//! On-disk combat save format.
//!
//! Layout: 4-byte magic, little-endian format version, 32-byte SHA-256
//! of the compressed body, then the LZ4-compressed MessagePack body.
//! Corruption and version skew are detected before deserialization ever
//! runs.

use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use super::error::SaveError;
use super::SAVE_VERSION;
use crate::engine::WeaponStateMachine;
use crate::models::Combatant;

const MAGIC: &[u8; 4] = b"TCSV";
const CHECKSUM_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + 4 + CHECKSUM_LEN;

/// Persistent combat state of one combatant: the character record plus
/// its weapon runtime (current state id, ammunition). Pending event ids
/// are transient and not part of the save.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PersistedCombatant {
    pub combatant: Combatant,
    pub machine: WeaponStateMachine,
}

/// Combat snapshot as embedded in a larger save document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CombatSave {
    /// Save format version for migration.
    pub version: u32,

    /// Save timestamp (unix milliseconds).
    pub timestamp: u64,

    /// Simulation tick the snapshot was taken at.
    pub tick: u64,

    pub combatants: Vec<PersistedCombatant>,
}

impl CombatSave {
    pub fn new(tick: u64, combatants: Vec<PersistedCombatant>) -> Self {
        Self { version: SAVE_VERSION, timestamp: current_timestamp(), tick, combatants }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        let mut ids = std::collections::HashSet::new();
        for entry in &self.combatants {
            if !ids.insert(entry.combatant.id) {
                return Err(SaveError::Corrupted);
            }
        }
        Ok(())
    }
}

fn current_timestamp() -> u64 {
    let now = OffsetDateTime::now_utc();
    (now.unix_timestamp_nanos() / 1_000_000) as u64
}

pub fn serialize_and_compress(save: &CombatSave) -> Result<Vec<u8>, SaveError> {
    let body = to_vec_named(save)?;
    let compressed = compress_prepend_size(&body);

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&SAVE_VERSION.to_le_bytes());
    out.extend_from_slice(&Sha256::digest(&compressed));
    out.extend_from_slice(&compressed);
    Ok(out)
}

pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<CombatSave, SaveError> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(SaveError::Corrupted);
    }
    let mut version_bytes = [0u8; 4];
    version_bytes.copy_from_slice(&bytes[MAGIC.len()..MAGIC.len() + 4]);
    let version = u32::from_le_bytes(version_bytes);
    if version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: version, expected: SAVE_VERSION });
    }

    let checksum = &bytes[MAGIC.len() + 4..HEADER_LEN];
    let compressed = &bytes[HEADER_LEN..];
    if Sha256::digest(compressed).as_slice() != checksum {
        return Err(SaveError::ChecksumMismatch);
    }

    let body = decompress_size_prepended(compressed).map_err(|_| SaveError::Decompression)?;
    let save: CombatSave = from_slice(&body)?;
    save.validate()?;
    Ok(save)
}
