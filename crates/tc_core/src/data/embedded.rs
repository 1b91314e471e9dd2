//! Embedded default weapon catalog.
//!
//! The catalog JSON is compiled into the binary with `include_str!` and
//! parsed (and validated) once on first access, so the engine works with
//! zero file I/O. External weapon data goes through
//! [`super::load_weapon_definitions`] instead.

use once_cell::sync::Lazy;

use crate::models::WeaponDefinition;

/// Default weapon catalog JSON (~2KB).
pub const DEFAULT_WEAPONS_JSON: &str = include_str!("../../data/weapons.json");

static DEFAULT_WEAPONS: Lazy<Vec<WeaponDefinition>> = Lazy::new(|| {
    super::load_weapon_definitions(DEFAULT_WEAPONS_JSON)
        .unwrap_or_else(|e| panic!("embedded weapon catalog is invalid: {}", e))
});

/// All weapons in the embedded catalog.
pub fn default_weapons() -> &'static [WeaponDefinition] {
    &DEFAULT_WEAPONS
}

/// Look up an embedded weapon by id.
pub fn default_weapon(id: &str) -> Option<&'static WeaponDefinition> {
    DEFAULT_WEAPONS.iter().find(|w| w.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses_and_validates() {
        let weapons = default_weapons();
        assert!(weapons.len() >= 4);
        for weapon in weapons {
            weapon.validate().unwrap();
        }
    }

    #[test]
    fn test_catalog_has_both_categories() {
        assert!(default_weapon("pistol").unwrap().is_ranged());
        assert!(!default_weapon("knife").unwrap().is_ranged());
        assert!(default_weapon("no_such_weapon").is_none());
    }
}
