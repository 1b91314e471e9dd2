//! Combatants and their persistent per-character combat settings.

use serde::{Deserialize, Serialize};

use crate::Tick;

/// Stable identifier for one combatant within a skirmish.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CombatantId(pub u32);

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-combatant ranged firing preference, persisted with the character.
///
/// `aimed_fire == true`: progress to aiming before firing and recover
/// back to aiming. `false`: fire from pointed-from-hip (faster, less
/// accurate) and recover back to pointed-from-hip. Melee weapons ignore
/// this entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiringPreference {
    pub aimed_fire: bool,
}

impl Default for FiringPreference {
    fn default() -> Self {
        Self { aimed_fire: true }
    }
}

/// One participant in a skirmish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    /// Combat skill, 0-100 scale.
    pub skill: f32,
    pub health: f32,
    /// World position in meters, used for range/reach gating.
    pub position: (f32, f32),
    #[serde(default)]
    pub firing_preference: FiringPreference,
    /// While `current_tick < recovery_ends_at_tick`, new attack requests
    /// are rejected outright (strict comparison: a request exactly at
    /// the boundary tick is accepted).
    #[serde(default)]
    pub recovery_ends_at_tick: Tick,
}

impl Combatant {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn in_recovery(&self, current_tick: Tick) -> bool {
        current_tick < self.recovery_ends_at_tick
    }

    pub fn distance_to(&self, other: &Combatant) -> f32 {
        let dx = self.position.0 - other.position.0;
        let dy = self.position.1 - other.position.1;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combatant(id: u32) -> Combatant {
        Combatant {
            id: CombatantId(id),
            name: format!("Trooper {}", id),
            skill: 60.0,
            health: 100.0,
            position: (0.0, 0.0),
            firing_preference: FiringPreference::default(),
            recovery_ends_at_tick: 0,
        }
    }

    #[test]
    fn test_recovery_boundary_is_strict() {
        let mut c = combatant(1);
        c.recovery_ends_at_tick = 100;
        assert!(c.in_recovery(99));
        // Exactly at the boundary the combatant is free again.
        assert!(!c.in_recovery(100));
        assert!(!c.in_recovery(101));
    }

    #[test]
    fn test_distance() {
        let a = combatant(1);
        let mut b = combatant(2);
        b.position = (3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }
}
