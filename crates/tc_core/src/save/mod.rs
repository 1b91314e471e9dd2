//! Combat-state persistence.
//!
//! The engine persists only what §survives a session: weapon definition
//! references (by id), each machine's current state id and ammunition,
//! the combatant recovery tick, and the firing preference. Scheduled
//! events are transient and are rebuilt by play, never saved.

pub mod error;
pub mod format;

pub use error::SaveError;
pub use format::{
    decompress_and_deserialize, serialize_and_compress, CombatSave, PersistedCombatant,
};

use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::Path;

use crate::engine::CombatCoordinator;

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Snapshot the coordinator's persistent combat state.
pub fn snapshot(coordinator: &CombatCoordinator) -> CombatSave {
    let combatants = coordinator
        .combatant_ids()
        .into_iter()
        .filter_map(|id| {
            let mut machine = coordinator.machine(id)?.clone();
            // Event ids do not survive a run; an in-flight transition is
            // simply dropped and the weapon resumes from its saved state.
            machine.clear_pending();
            Some(PersistedCombatant { combatant: coordinator.combatant(id)?.clone(), machine })
        })
        .collect();
    CombatSave::new(coordinator.current_tick(), combatants)
}

/// Rebuild combatants and weapon machines from a snapshot.
///
/// The coordinator must already have the referenced weapon definitions
/// registered; an unknown weapon id fails the whole restore.
pub fn restore(coordinator: &mut CombatCoordinator, save: &CombatSave) -> crate::Result<()> {
    for entry in &save.combatants {
        coordinator.restore_combatant(entry.combatant.clone(), entry.machine.clone())?;
    }
    log::info!("restored {} combatants from save", save.combatants.len());
    Ok(())
}

/// Write a save atomically: temp file in the same directory, then rename.
pub fn write_to_path(path: &Path, save: &CombatSave) -> Result<(), SaveError> {
    let bytes = serialize_and_compress(save)?;
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    rename(&tmp_path, path)?;
    log::info!("combat save written to {}", path.display());
    Ok(())
}

pub fn read_from_path(path: &Path) -> Result<CombatSave, SaveError> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    decompress_and_deserialize(&bytes)
}
