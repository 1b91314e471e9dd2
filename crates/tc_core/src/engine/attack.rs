//! Attack sequencing.
//!
//! One attack is a chain of scheduled weapon-state transitions ending in
//! the firing state. The sequence manager owns the per-combatant attack
//! sessions and the gate every new request passes through; it never
//! queues a rejected request, it reports the rejection and leaves retry
//! to the caller.

use std::collections::HashMap;

use super::scheduler::{EventId, EventPayload, EventScheduler};
use super::state_machine::WeaponStateMachine;
use crate::models::{Combatant, CombatantId, WeaponDefinition};
use crate::Tick;

/// Business-level rejection of an attack request. Ordinary data, never
/// an error; the caller decides whether to retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// An attack is already in progress for this combatant.
    Busy,
    /// The attacker is inside its recovery window.
    Recovering,
    /// The attacker is down.
    AttackerDown,
    /// The target is down.
    TargetDown,
    /// Unknown target, or attacker targeting itself.
    InvalidTarget,
    /// Target beyond weapon range/reach.
    OutOfRange,
    /// Ranged weapon with an empty magazine.
    OutOfAmmunition,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            RejectReason::Busy => "busy",
            RejectReason::Recovering => "recovering",
            RejectReason::AttackerDown => "attacker down",
            RejectReason::TargetDown => "target down",
            RejectReason::InvalidTarget => "invalid target",
            RejectReason::OutOfRange => "out of range",
            RejectReason::OutOfAmmunition => "out of ammunition",
        };
        write!(f, "{}", reason)
    }
}

/// Result of an attack request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackDecision {
    /// First transition scheduled; the sequence is now in flight.
    Scheduled { first_event: EventId, fires_at: Tick },
    Rejected(RejectReason),
}

impl AttackDecision {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, AttackDecision::Scheduled { .. })
    }
}

/// One in-flight attack: who the sequence will resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackSession {
    pub target: CombatantId,
}

/// Tracks in-flight attack sequences and starts new ones.
#[derive(Debug, Default)]
pub struct AttackSequenceManager {
    active: HashMap<CombatantId, AttackSession>,
}

impl AttackSequenceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, combatant: CombatantId) -> Option<AttackSession> {
        self.active.get(&combatant).copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Validate a request and, if accepted, schedule the first state
    /// transition. A rejection schedules nothing and changes nothing.
    pub fn start_attack(
        &mut self,
        attacker: &Combatant,
        target: &Combatant,
        weapon: &WeaponDefinition,
        machine: &mut WeaponStateMachine,
        scheduler: &mut EventScheduler,
    ) -> AttackDecision {
        if let Some(reason) = Self::gate(attacker, target, weapon, machine, scheduler.current_tick())
        {
            log::debug!("attack by {} rejected: {}", attacker.id, reason);
            return AttackDecision::Rejected(reason);
        }

        let now = scheduler.current_tick();
        let fires_at = now + Tick::from(weapon.duration_ticks(machine.current_state));
        let first_event = scheduler.schedule(
            fires_at,
            attacker.id,
            EventPayload::AdvanceWeaponState { combatant: attacker.id },
        );
        machine.begin_transition(first_event);
        self.active.insert(attacker.id, AttackSession { target: target.id });
        log::debug!(
            "{} attacks {} with {}: first transition at tick {}",
            attacker.id,
            target.id,
            weapon.id,
            fires_at
        );
        AttackDecision::Scheduled { first_event, fires_at }
    }

    /// The rejection checks, in contract order: busy first, recovery
    /// second, then target/range/ammunition validity.
    fn gate(
        attacker: &Combatant,
        target: &Combatant,
        weapon: &WeaponDefinition,
        machine: &WeaponStateMachine,
        now: Tick,
    ) -> Option<RejectReason> {
        if machine.is_busy() {
            return Some(RejectReason::Busy);
        }
        if attacker.in_recovery(now) {
            return Some(RejectReason::Recovering);
        }
        if !attacker.is_alive() {
            return Some(RejectReason::AttackerDown);
        }
        if attacker.id == target.id {
            return Some(RejectReason::InvalidTarget);
        }
        if !target.is_alive() {
            return Some(RejectReason::TargetDown);
        }
        if attacker.distance_to(target) > weapon.max_distance_m() {
            return Some(RejectReason::OutOfRange);
        }
        if !machine.has_ammunition() {
            return Some(RejectReason::OutOfAmmunition);
        }
        None
    }

    /// End the session after recovery completes.
    pub fn finish(&mut self, combatant: CombatantId) {
        self.active.remove(&combatant);
    }

    /// Drop a session mid-flight (death, removal). The caller is
    /// responsible for cancelling the scheduled transition.
    pub fn abort(&mut self, combatant: CombatantId) -> bool {
        self.active.remove(&combatant).is_some()
    }
}
