//! Weapon data loading.
//!
//! The engine only consumes validated [`WeaponDefinition`] values; both
//! the embedded catalog and external declarative data pass through
//! [`load_weapon_definitions`], so a malformed state graph is rejected
//! before any combatant can equip the weapon.

pub mod embedded;

pub use embedded::{default_weapon, default_weapons, DEFAULT_WEAPONS_JSON};

use crate::error::{CombatError, Result};
use crate::models::WeaponDefinition;

/// Parse weapon definitions from JSON and validate every state graph.
pub fn load_weapon_definitions(json: &str) -> Result<Vec<WeaponDefinition>> {
    let weapons: Vec<WeaponDefinition> = serde_json::from_str(json)?;
    let mut ids = std::collections::HashSet::new();
    for weapon in &weapons {
        weapon.validate()?;
        if !ids.insert(weapon.id.clone()) {
            return Err(CombatError::InvalidWeaponDefinition {
                weapon: weapon.id.clone(),
                reason: "duplicate weapon id".to_string(),
            });
        }
    }
    log::debug!("loaded {} weapon definitions", weapons.len());
    Ok(weapons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_graph_rejected_at_load() {
        // Firing state missing entirely.
        let json = r#"[{
            "id": "broken",
            "name": "Broken",
            "category": "melee",
            "reach_m": 1.0,
            "damage": 5.0,
            "states": [
                { "id": "holstered", "duration_ticks": 5, "next": "ready" },
                { "id": "ready", "duration_ticks": 5 },
                { "id": "recovering", "duration_ticks": 5 }
            ]
        }]"#;
        assert!(load_weapon_definitions(json).is_err());
    }

    #[test]
    fn test_duplicate_weapon_id_rejected() {
        let one: Vec<WeaponDefinition> =
            serde_json::from_str(DEFAULT_WEAPONS_JSON).expect("catalog parses");
        let doubled: Vec<WeaponDefinition> =
            one.iter().chain(one.iter()).cloned().collect();
        let json = serde_json::to_string(&doubled).unwrap();
        let err = load_weapon_definitions(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate weapon id"), "{}", err);
    }
}
