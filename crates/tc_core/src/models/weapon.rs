//! Weapon definitions and their state graphs.
//!
//! A weapon is described by one flat, explicitly-tagged record: shared
//! fields on [`WeaponDefinition`], category-specific fields inside
//! [`WeaponClass`]. There is deliberately no Weapon base type with
//! ranged/melee subtypes; everything a combat resolution needs is
//! reachable from the one record.

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, Result};

/// Named states a weapon passes through while executing an attack.
///
/// Ranged weapons use the full set. Melee weapons skip the two holding
/// states between `Ready` and `Firing` (`Firing` doubles as the strike
/// impact state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponStateId {
    Holstered,
    Drawing,
    Ready,
    PointedFromHip,
    Aiming,
    Firing,
    Recovering,
}

impl WeaponStateId {
    /// States an attack sequence can terminate in and a new one can
    /// start from without re-drawing.
    pub fn is_hold_state(self) -> bool {
        matches!(
            self,
            WeaponStateId::Ready | WeaponStateId::PointedFromHip | WeaponStateId::Aiming
        )
    }
}

impl std::fmt::Display for WeaponStateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WeaponStateId::Holstered => "holstered",
            WeaponStateId::Drawing => "drawing",
            WeaponStateId::Ready => "ready",
            WeaponStateId::PointedFromHip => "pointed_from_hip",
            WeaponStateId::Aiming => "aiming",
            WeaponStateId::Firing => "firing",
            WeaponStateId::Recovering => "recovering",
        };
        write!(f, "{}", name)
    }
}

/// One node of a weapon's state graph.
///
/// `duration_ticks` is how long the weapon stays in this state before a
/// driven attack sequence advances it. `next` is the declared next state
/// on normal completion; the two dynamic branch points
/// (`PointedFromHip`, `Recovering`) declare `None` and are resolved per
/// transition by the engine from the attacker's firing preference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    pub id: WeaponStateId,
    pub duration_ticks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<WeaponStateId>,
}

/// Category tag with category-specific ballistic/melee parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum WeaponClass {
    Ranged {
        /// Maximum engagement distance in meters.
        range_m: f32,
        /// Base accuracy in [0, 1] before skill and stance modifiers.
        accuracy: f32,
        /// Rounds carried when the weapon is equipped.
        ammunition_capacity: u32,
    },
    Melee {
        /// Strike distance in meters.
        reach_m: f32,
    },
}

/// Immutable, data-loaded description of one weapon type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub class: WeaponClass,
    /// Base damage before severity/location rolls.
    pub damage: f32,
    /// State graph, initial state first.
    pub states: Vec<WeaponState>,
}

impl WeaponDefinition {
    pub fn is_ranged(&self) -> bool {
        matches!(self.class, WeaponClass::Ranged { .. })
    }

    /// Maximum distance at which this weapon can attack.
    pub fn max_distance_m(&self) -> f32 {
        match self.class {
            WeaponClass::Ranged { range_m, .. } => range_m,
            WeaponClass::Melee { reach_m } => reach_m,
        }
    }

    pub fn ammunition_capacity(&self) -> Option<u32> {
        match self.class {
            WeaponClass::Ranged { ammunition_capacity, .. } => Some(ammunition_capacity),
            WeaponClass::Melee { .. } => None,
        }
    }

    pub fn base_accuracy(&self) -> f32 {
        match self.class {
            WeaponClass::Ranged { accuracy, .. } => accuracy,
            // Melee accuracy comes entirely from skill.
            WeaponClass::Melee { .. } => 0.5,
        }
    }

    /// First state of the graph; where an equipped weapon starts.
    pub fn initial_state(&self) -> WeaponStateId {
        self.states[0].id
    }

    pub fn state(&self, id: WeaponStateId) -> Option<&WeaponState> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn duration_ticks(&self, id: WeaponStateId) -> u32 {
        self.state(id).map(|s| s.duration_ticks).unwrap_or(0)
    }

    /// Duration of the recovering state; also the length of the
    /// combatant recovery window set at attack resolution.
    pub fn recovery_duration_ticks(&self) -> u32 {
        self.duration_ticks(WeaponStateId::Recovering)
    }

    /// Load-time validation of the state-graph invariants.
    ///
    /// Rejecting a malformed definition here means no combatant can ever
    /// equip it; a bad graph is never discovered mid-combat.
    pub fn validate(&self) -> Result<()> {
        if self.states.is_empty() {
            return self.invalid("state graph is empty");
        }

        let mut seen = std::collections::HashSet::new();
        for state in &self.states {
            if !seen.insert(state.id) {
                return self.invalid(&format!("duplicate state '{}'", state.id));
            }
            if state.duration_ticks == 0 {
                return self.invalid(&format!("state '{}' has zero duration", state.id));
            }
        }

        if self.state(WeaponStateId::Firing).is_none() {
            return self.invalid("no firing state");
        }
        let recovering = match self.state(WeaponStateId::Recovering) {
            Some(s) => s,
            None => return self.invalid("no recovering state"),
        };
        if recovering.next.is_some() {
            // Recovery target is chosen per combatant (firing preference),
            // never hardcoded in the graph.
            return self.invalid("recovering state must not declare a fixed next state");
        }

        if self.is_ranged() {
            let hip = match self.state(WeaponStateId::PointedFromHip) {
                Some(s) => s,
                None => return self.invalid("ranged weapon has no pointed_from_hip state"),
            };
            if hip.next.is_some() {
                return self.invalid("pointed_from_hip must not declare a fixed next state");
            }
            if self.state(WeaponStateId::Aiming).is_none() {
                return self.invalid("ranged weapon has no aiming state");
            }
        }

        self.check_firing_reachable()
    }

    /// Walks the forward path from the initial state, resolving the
    /// dynamic branch points the same way the engine would, and checks
    /// that firing is reached without revisiting a state.
    fn check_firing_reachable(&self) -> Result<()> {
        let mut visited = std::collections::HashSet::new();
        let mut current = self.initial_state();
        loop {
            if current == WeaponStateId::Firing {
                return Ok(());
            }
            if !visited.insert(current) {
                return self.invalid(&format!("cycle in forward path at '{}'", current));
            }
            let state = match self.state(current) {
                Some(s) => s,
                None => return self.invalid(&format!("missing state '{}'", current)),
            };
            current = match (current, state.next) {
                // Dynamic branch: take the longer (aimed) path so every
                // state on it gets visited and checked.
                (WeaponStateId::PointedFromHip, None) => WeaponStateId::Aiming,
                (_, Some(next)) => next,
                (other, None) => {
                    return self.invalid(&format!(
                        "state '{}' has no next state and firing was not reached",
                        other
                    ))
                }
            };
        }
    }

    fn invalid(&self, reason: &str) -> Result<()> {
        Err(CombatError::InvalidWeaponDefinition {
            weapon: self.id.clone(),
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranged_states() -> Vec<WeaponState> {
        vec![
            WeaponState {
                id: WeaponStateId::Holstered,
                duration_ticks: 6,
                next: Some(WeaponStateId::Drawing),
            },
            WeaponState {
                id: WeaponStateId::Drawing,
                duration_ticks: 30,
                next: Some(WeaponStateId::Ready),
            },
            WeaponState {
                id: WeaponStateId::Ready,
                duration_ticks: 12,
                next: Some(WeaponStateId::PointedFromHip),
            },
            WeaponState { id: WeaponStateId::PointedFromHip, duration_ticks: 18, next: None },
            WeaponState {
                id: WeaponStateId::Aiming,
                duration_ticks: 30,
                next: Some(WeaponStateId::Firing),
            },
            WeaponState {
                id: WeaponStateId::Firing,
                duration_ticks: 3,
                next: Some(WeaponStateId::Recovering),
            },
            WeaponState { id: WeaponStateId::Recovering, duration_ticks: 36, next: None },
        ]
    }

    fn pistol() -> WeaponDefinition {
        WeaponDefinition {
            id: "test_pistol".to_string(),
            name: "Test Pistol".to_string(),
            class: WeaponClass::Ranged { range_m: 40.0, accuracy: 0.7, ammunition_capacity: 6 },
            damage: 25.0,
            states: ranged_states(),
        }
    }

    #[test]
    fn test_valid_ranged_definition() {
        assert!(pistol().validate().is_ok());
    }

    #[test]
    fn test_firing_unreachable_rejected() {
        let mut weapon = pistol();
        // Break the chain: ready no longer leads anywhere.
        weapon.states[2].next = None;
        let err = weapon.validate().unwrap_err();
        assert!(err.to_string().contains("firing was not reached"), "{}", err);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut weapon = pistol();
        weapon.states[1].duration_ticks = 0;
        assert!(weapon.validate().is_err());
    }

    #[test]
    fn test_duplicate_state_rejected() {
        let mut weapon = pistol();
        weapon.states.push(WeaponState {
            id: WeaponStateId::Ready,
            duration_ticks: 5,
            next: Some(WeaponStateId::Firing),
        });
        let err = weapon.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{}", err);
    }

    #[test]
    fn test_fixed_recovery_target_rejected() {
        let mut weapon = pistol();
        weapon.states[6].next = Some(WeaponStateId::Aiming);
        assert!(weapon.validate().is_err());
    }

    #[test]
    fn test_forward_cycle_rejected() {
        let mut weapon = pistol();
        // aiming loops back to ready instead of reaching firing
        weapon.states[4].next = Some(WeaponStateId::Ready);
        let err = weapon.validate().unwrap_err();
        assert!(err.to_string().contains("cycle"), "{}", err);
    }

    #[test]
    fn test_melee_definition_skips_hold_states() {
        let weapon = WeaponDefinition {
            id: "test_knife".to_string(),
            name: "Test Knife".to_string(),
            class: WeaponClass::Melee { reach_m: 1.5 },
            damage: 12.0,
            states: vec![
                WeaponState {
                    id: WeaponStateId::Holstered,
                    duration_ticks: 6,
                    next: Some(WeaponStateId::Drawing),
                },
                WeaponState {
                    id: WeaponStateId::Drawing,
                    duration_ticks: 18,
                    next: Some(WeaponStateId::Ready),
                },
                WeaponState {
                    id: WeaponStateId::Ready,
                    duration_ticks: 9,
                    next: Some(WeaponStateId::Firing),
                },
                WeaponState {
                    id: WeaponStateId::Firing,
                    duration_ticks: 6,
                    next: Some(WeaponStateId::Recovering),
                },
                WeaponState { id: WeaponStateId::Recovering, duration_ticks: 30, next: None },
            ],
        };
        assert!(weapon.validate().is_ok());
        assert_eq!(weapon.max_distance_m(), 1.5);
        assert_eq!(weapon.ammunition_capacity(), None);
    }

    #[test]
    fn test_json_round_trip_keeps_category_fields() {
        let json = serde_json::to_string(&pistol()).unwrap();
        let back: WeaponDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pistol());
        assert!(json.contains("\"category\":\"ranged\""));
    }
}
