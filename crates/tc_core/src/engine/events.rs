//! Observable combat events.
//!
//! Everything the rendering/audio/log layers need to react to is emitted
//! here as serializable data. The contract that matters most:
//! `attack_executed` is recorded when the firing state is actually
//! entered, never when an attack is merely scheduled, so downstream
//! audio plays once per shot, not once per scheduling attempt.

use serde::{Deserialize, Serialize};

use super::probability::HitLocation;
use crate::models::{CombatantId, WeaponStateId};
use crate::Tick;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombatEvent {
    StateChanged {
        tick: Tick,
        combatant: CombatantId,
        from: WeaponStateId,
        to: WeaponStateId,
    },
    AttackExecuted {
        tick: Tick,
        attacker: CombatantId,
        target: CombatantId,
        weapon: String,
        /// True when a ranged shot was executed from `pointed_from_hip`.
        hip_fire: bool,
    },
    Hit {
        tick: Tick,
        attacker: CombatantId,
        target: CombatantId,
        damage: f32,
        location: HitLocation,
        severity: f32,
    },
    Miss {
        tick: Tick,
        attacker: CombatantId,
        target: CombatantId,
    },
    CombatantDowned {
        tick: Tick,
        combatant: CombatantId,
    },
}

/// Ordered record of everything observable that happened in a run.
///
/// External subscribers (visuals, sound, combat log UI) read this; tests
/// use the counters to pin down the fire-once-per-execution guarantees.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: CombatEvent) {
        log::debug!("combat event: {:?}", event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn attacks_executed(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, CombatEvent::AttackExecuted { .. }))
            .count()
    }

    pub fn hits(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, CombatEvent::Hit { .. })).count()
    }

    pub fn misses(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, CombatEvent::Miss { .. })).count()
    }

    /// How many times `combatant` entered the given state.
    pub fn state_entries(&self, combatant: CombatantId, state: WeaponStateId) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, CombatEvent::StateChanged { combatant: c, to, .. }
                    if *c == combatant && *to == state)
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = CombatEvent::Miss {
            tick: 120,
            attacker: CombatantId(1),
            target: CombatantId(2),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"miss\""), "{}", json);
        let back: CombatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_log_counters() {
        let mut log = EventLog::new();
        log.record(CombatEvent::StateChanged {
            tick: 1,
            combatant: CombatantId(1),
            from: WeaponStateId::PointedFromHip,
            to: WeaponStateId::Firing,
        });
        log.record(CombatEvent::AttackExecuted {
            tick: 1,
            attacker: CombatantId(1),
            target: CombatantId(2),
            weapon: "pistol".to_string(),
            hip_fire: true,
        });
        log.record(CombatEvent::Miss { tick: 1, attacker: CombatantId(1), target: CombatantId(2) });
        assert_eq!(log.attacks_executed(), 1);
        assert_eq!(log.misses(), 1);
        assert_eq!(log.hits(), 0);
        assert_eq!(log.state_entries(CombatantId(1), WeaponStateId::Firing), 1);
    }
}
