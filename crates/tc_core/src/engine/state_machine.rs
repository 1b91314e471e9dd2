//! Per-combatant weapon runtime state.
//!
//! A [`WeaponStateMachine`] is created when a combatant equips a weapon
//! and is advanced one state at a time by the attack sequence. The
//! critical invariant: at most one pending scheduled transition per
//! machine at any time. Violating it is what produces duplicated attack
//! scheduling, so [`WeaponStateMachine::begin_transition`] fails fast.

use serde::{Deserialize, Serialize};

use super::scheduler::EventId;
use crate::models::{FiringPreference, WeaponDefinition, WeaponStateId};
use crate::Tick;

/// Next state on completing `current`, resolved per transition.
///
/// Pure function of the definition, the current state, and the
/// attacker's firing preference at the moment of the decision. The two
/// dynamic branch points:
///
/// - `pointed_from_hip`: continue to `aiming` for aimed fire, or go
///   straight to `firing` for hip fire;
/// - `recovering`: close the cycle back into the preferred holding state
///   (`aiming` / `pointed_from_hip` for ranged, `ready` for melee).
///
/// Everything else follows the graph's declared edge. The preference is
/// read here and never retroactively, so toggling it mid-sequence simply
/// steers the next branch point reached.
pub fn next_state(
    weapon: &WeaponDefinition,
    current: WeaponStateId,
    preference: FiringPreference,
) -> Option<WeaponStateId> {
    match current {
        WeaponStateId::PointedFromHip => Some(if preference.aimed_fire {
            WeaponStateId::Aiming
        } else {
            WeaponStateId::Firing
        }),
        WeaponStateId::Recovering => Some(if !weapon.is_ranged() {
            WeaponStateId::Ready
        } else if preference.aimed_fire {
            WeaponStateId::Aiming
        } else {
            WeaponStateId::PointedFromHip
        }),
        other => weapon.state(other).and_then(|s| s.next),
    }
}

/// Mutable runtime state of one combatant-weapon pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStateMachine {
    /// Id of the owning [`WeaponDefinition`].
    pub weapon_id: String,
    pub current_state: WeaponStateId,
    pub state_entered_at_tick: Tick,
    /// The one scheduled transition in flight, if any. Not persisted:
    /// event ids are meaningless across runs.
    #[serde(skip)]
    pub pending_event: Option<EventId>,
    /// Rounds left; `None` for melee weapons.
    pub ammunition_remaining: Option<u32>,
}

impl WeaponStateMachine {
    pub fn new(weapon: &WeaponDefinition, tick: Tick) -> Self {
        Self {
            weapon_id: weapon.id.clone(),
            current_state: weapon.initial_state(),
            state_entered_at_tick: tick,
            pending_event: None,
            ammunition_remaining: weapon.ammunition_capacity(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending_event.is_some()
    }

    pub fn has_ammunition(&self) -> bool {
        self.ammunition_remaining.map_or(true, |rounds| rounds > 0)
    }

    pub fn spend_round(&mut self) {
        if let Some(rounds) = self.ammunition_remaining.as_mut() {
            *rounds = rounds.saturating_sub(1);
        }
    }

    /// Record the scheduled transition that will advance this machine.
    ///
    /// # Panics
    ///
    /// Panics if a transition is already pending: the one-pending-event
    /// invariant was violated upstream and continuing would duplicate
    /// the attack.
    pub fn begin_transition(&mut self, event_id: EventId) {
        assert!(
            self.pending_event.is_none(),
            "weapon '{}' already has a pending transition ({:?})",
            self.weapon_id,
            self.pending_event
        );
        self.pending_event = Some(event_id);
    }

    /// Consume the pending transition if `event_id` is still the live
    /// one. Returns `false` for a stale or unknown event, which the
    /// caller treats as a silent no-op.
    pub fn take_pending(&mut self, event_id: EventId) -> bool {
        if self.pending_event == Some(event_id) {
            self.pending_event = None;
            true
        } else {
            false
        }
    }

    pub fn clear_pending(&mut self) {
        self.pending_event = None;
    }

    pub fn enter(&mut self, state: WeaponStateId, tick: Tick) {
        self.current_state = state;
        self.state_entered_at_tick = tick;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_weapon;
    use crate::engine::scheduler::{EventPayload, EventScheduler};
    use crate::models::CombatantId;

    fn aimed() -> FiringPreference {
        FiringPreference { aimed_fire: true }
    }

    fn hip() -> FiringPreference {
        FiringPreference { aimed_fire: false }
    }

    #[test]
    fn test_hip_state_branches_on_preference() {
        let pistol = default_weapon("pistol").unwrap();
        assert_eq!(
            next_state(pistol, WeaponStateId::PointedFromHip, aimed()),
            Some(WeaponStateId::Aiming)
        );
        assert_eq!(
            next_state(pistol, WeaponStateId::PointedFromHip, hip()),
            Some(WeaponStateId::Firing)
        );
    }

    #[test]
    fn test_recovery_branches_on_preference() {
        let pistol = default_weapon("pistol").unwrap();
        assert_eq!(
            next_state(pistol, WeaponStateId::Recovering, aimed()),
            Some(WeaponStateId::Aiming)
        );
        assert_eq!(
            next_state(pistol, WeaponStateId::Recovering, hip()),
            Some(WeaponStateId::PointedFromHip)
        );
    }

    #[test]
    fn test_melee_ignores_firing_preference() {
        let knife = default_weapon("knife").unwrap();
        for pref in [aimed(), hip()] {
            assert_eq!(
                next_state(knife, WeaponStateId::Recovering, pref),
                Some(WeaponStateId::Ready)
            );
            assert_eq!(
                next_state(knife, WeaponStateId::Ready, pref),
                Some(WeaponStateId::Firing)
            );
        }
    }

    #[test]
    fn test_declared_edges_followed_elsewhere() {
        let pistol = default_weapon("pistol").unwrap();
        assert_eq!(
            next_state(pistol, WeaponStateId::Holstered, aimed()),
            Some(WeaponStateId::Drawing)
        );
        assert_eq!(
            next_state(pistol, WeaponStateId::Firing, hip()),
            Some(WeaponStateId::Recovering)
        );
    }

    #[test]
    #[should_panic(expected = "already has a pending transition")]
    fn test_double_begin_transition_panics() {
        let pistol = default_weapon("pistol").unwrap();
        let mut machine = WeaponStateMachine::new(pistol, 0);
        let mut sched = EventScheduler::new();
        let owner = CombatantId(1);
        let a = sched.schedule(5, owner, EventPayload::AdvanceWeaponState { combatant: owner });
        let b = sched.schedule(6, owner, EventPayload::AdvanceWeaponState { combatant: owner });
        machine.begin_transition(a);
        machine.begin_transition(b);
    }

    #[test]
    fn test_stale_event_is_ignored() {
        let pistol = default_weapon("pistol").unwrap();
        let mut machine = WeaponStateMachine::new(pistol, 0);
        let mut sched = EventScheduler::new();
        let owner = CombatantId(1);
        let a = sched.schedule(5, owner, EventPayload::AdvanceWeaponState { combatant: owner });
        let b = sched.schedule(6, owner, EventPayload::AdvanceWeaponState { combatant: owner });
        machine.begin_transition(a);
        assert!(!machine.take_pending(b));
        assert!(machine.is_busy());
        assert!(machine.take_pending(a));
        assert!(!machine.is_busy());
    }

    #[test]
    fn test_ammunition_bookkeeping() {
        let pistol = default_weapon("pistol").unwrap();
        let mut machine = WeaponStateMachine::new(pistol, 0);
        assert_eq!(machine.ammunition_remaining, Some(6));
        for _ in 0..6 {
            assert!(machine.has_ammunition());
            machine.spend_round();
        }
        assert!(!machine.has_ammunition());

        let knife = default_weapon("knife").unwrap();
        let mut blade = WeaponStateMachine::new(knife, 0);
        blade.spend_round();
        assert!(blade.has_ammunition());
    }
}
