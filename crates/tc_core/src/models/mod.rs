pub mod combatant;
pub mod weapon;

pub use combatant::{Combatant, CombatantId, FiringPreference};
pub use weapon::{WeaponClass, WeaponDefinition, WeaponState, WeaponStateId};
