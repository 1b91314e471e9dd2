//! Top-level combat orchestration.
//!
//! The coordinator receives attack requests, enforces the busy/recovery
//! gates, interprets due scheduler events (the continuation chain of
//! each attack sequence), and is the sole writer of cross-combatant
//! effects: damage is applied here and nowhere else, exactly once per
//! resolved attack.

use std::collections::HashMap;

use super::attack::{AttackDecision, AttackSequenceManager, RejectReason};
use super::events::{CombatEvent, EventLog};
use super::probability::{hit_probability, roll_damage};
use super::rng::RandomProvider;
use super::scheduler::{EventPayload, EventScheduler, ScheduledEvent};
use super::state_machine::{next_state, WeaponStateMachine};
use crate::models::{Combatant, CombatantId, WeaponDefinition, WeaponStateId};
use crate::Tick;

pub struct CombatCoordinator {
    scheduler: EventScheduler,
    rng: Box<dyn RandomProvider>,
    weapons: HashMap<String, WeaponDefinition>,
    combatants: HashMap<CombatantId, Combatant>,
    machines: HashMap<CombatantId, WeaponStateMachine>,
    sequences: AttackSequenceManager,
    events: EventLog,
}

impl CombatCoordinator {
    /// The random provider is chosen once here, before the run starts;
    /// it is not swapped mid-run.
    pub fn new(rng: Box<dyn RandomProvider>) -> Self {
        Self {
            scheduler: EventScheduler::new(),
            rng,
            weapons: HashMap::new(),
            combatants: HashMap::new(),
            machines: HashMap::new(),
            sequences: AttackSequenceManager::new(),
            events: EventLog::new(),
        }
    }

    /// Register a validated weapon definition.
    pub fn register_weapon(&mut self, weapon: WeaponDefinition) {
        self.weapons.insert(weapon.id.clone(), weapon);
    }

    /// Add a combatant and equip the named weapon, creating its state
    /// machine at the graph's initial state.
    pub fn add_combatant(&mut self, combatant: Combatant, weapon_id: &str) -> crate::Result<()> {
        let weapon = self
            .weapons
            .get(weapon_id)
            .ok_or_else(|| crate::CombatError::UnknownWeapon(weapon_id.to_string()))?;
        let machine = WeaponStateMachine::new(weapon, self.scheduler.current_tick());
        self.machines.insert(combatant.id, machine);
        self.combatants.insert(combatant.id, combatant);
        Ok(())
    }

    /// Remove a combatant entirely (forced disarm, despawn). Cancels any
    /// scheduled work it owns; nothing dangles.
    pub fn remove_combatant(&mut self, id: CombatantId) {
        self.scheduler.cancel_owned_by(id);
        self.sequences.abort(id);
        if let Some(machine) = self.machines.get_mut(&id) {
            machine.clear_pending();
        }
        self.machines.remove(&id);
        self.combatants.remove(&id);
    }

    pub fn current_tick(&self) -> Tick {
        self.scheduler.current_tick()
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub fn machine(&self, id: CombatantId) -> Option<&WeaponStateMachine> {
        self.machines.get(&id)
    }

    /// All registered combatant ids, sorted for stable iteration order.
    pub fn combatant_ids(&self) -> Vec<CombatantId> {
        let mut ids: Vec<_> = self.combatants.keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Reinstall a combatant with a previously captured state machine,
    /// keeping its state, ammunition, and recovery window. The machine's
    /// weapon must already be registered.
    pub fn restore_combatant(
        &mut self,
        combatant: Combatant,
        mut machine: WeaponStateMachine,
    ) -> crate::Result<()> {
        if !self.weapons.contains_key(&machine.weapon_id) {
            return Err(crate::CombatError::UnknownWeapon(machine.weapon_id.clone()));
        }
        machine.clear_pending();
        self.machines.insert(combatant.id, machine);
        self.combatants.insert(combatant.id, combatant);
        Ok(())
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn scheduled_event_count(&self) -> usize {
        self.scheduler.len()
    }

    /// Flip a combatant's ranged firing preference. Read at the next
    /// transition decision; never applied retroactively.
    pub fn set_aimed_fire(&mut self, id: CombatantId, aimed_fire: bool) {
        if let Some(combatant) = self.combatants.get_mut(&id) {
            combatant.firing_preference.aimed_fire = aimed_fire;
        }
    }

    /// Entry point for the input/auto-targeting layer.
    ///
    /// Rejections are returned, never queued; issuing a redundant
    /// request costs the caller nothing but this check.
    pub fn request_attack(&mut self, attacker: CombatantId, target: CombatantId) -> AttackDecision {
        let Some(attacker_ref) = self.combatants.get(&attacker) else {
            return AttackDecision::Rejected(RejectReason::AttackerDown);
        };
        let Some(target_ref) = self.combatants.get(&target) else {
            return AttackDecision::Rejected(RejectReason::InvalidTarget);
        };
        let Some(machine) = self.machines.get_mut(&attacker) else {
            return AttackDecision::Rejected(RejectReason::AttackerDown);
        };
        let Some(weapon) = self.weapons.get(&machine.weapon_id) else {
            return AttackDecision::Rejected(RejectReason::AttackerDown);
        };
        self.sequences
            .start_attack(attacker_ref, target_ref, weapon, machine, &mut self.scheduler)
    }

    /// Advance the simulation clock, firing every due event in
    /// `(trigger_tick, sequence)` order. Called by the game loop once
    /// per tick with a monotonically non-decreasing tick.
    pub fn advance_to(&mut self, tick: Tick) {
        for event in self.scheduler.advance_to(tick) {
            self.handle_event(event);
        }
    }

    /// Interpret one due scheduled event: advance the owning weapon
    /// state machine a single state and continue or finish the chain.
    fn handle_event(&mut self, event: ScheduledEvent) {
        let EventPayload::AdvanceWeaponState { combatant } = event.payload;
        let now = self.scheduler.current_tick();

        let Some(machine) = self.machines.get_mut(&combatant) else {
            return;
        };
        // A stale event (superseded or cancelled after popping) is a
        // silent no-op; the state it targeted no longer exists.
        if !machine.take_pending(event.id) {
            log::trace!("stale transition event {:?} for {}", event.id, combatant);
            return;
        }
        let Some(weapon) = self.weapons.get(&machine.weapon_id) else {
            return;
        };
        let preference = self
            .combatants
            .get(&combatant)
            .map(|c| c.firing_preference)
            .unwrap_or_default();

        let from = machine.current_state;
        let Some(to) = next_state(weapon, from, preference) else {
            // Validated graphs always have a next state while a sequence
            // is driving; a dangling edge means the definition changed
            // under us, so stop the sequence.
            log::warn!("no next state from '{}' for {}", from, combatant);
            self.sequences.abort(combatant);
            return;
        };
        machine.enter(to, now);
        let weapon_id = machine.weapon_id.clone();
        let next_duration = Tick::from(weapon.duration_ticks(to));

        self.events.record(CombatEvent::StateChanged { tick: now, combatant, from, to });

        if to == WeaponStateId::Firing {
            self.execute_attack(combatant, &weapon_id, from, now);
        }

        if from == WeaponStateId::Recovering {
            // The cycle closed back into a holding state; the sequence
            // is complete and the machine is idle again.
            self.sequences.finish(combatant);
        } else if let Some(machine) = self.machines.get_mut(&combatant) {
            let next_event = self.scheduler.schedule(
                now + next_duration,
                combatant,
                EventPayload::AdvanceWeaponState { combatant },
            );
            machine.begin_transition(next_event);
        }
    }

    /// The firing state was actually entered: emit the one observable
    /// "attack executed" cue and resolve the outcome.
    fn execute_attack(
        &mut self,
        attacker: CombatantId,
        weapon_id: &str,
        previous_state: WeaponStateId,
        now: Tick,
    ) {
        let Some(target) = self.sequences.session(attacker).map(|s| s.target) else {
            log::warn!("firing state entered without an active session for {}", attacker);
            return;
        };
        let hip_fire = previous_state == WeaponStateId::PointedFromHip;

        self.events.record(CombatEvent::AttackExecuted {
            tick: now,
            attacker,
            target,
            weapon: weapon_id.to_string(),
            hip_fire,
        });
        if let Some(machine) = self.machines.get_mut(&attacker) {
            machine.spend_round();
        }
        self.resolve_attack(attacker, target, weapon_id, hip_fire, now);
    }

    /// Sole point where hit/miss is decided and damage applied.
    fn resolve_attack(
        &mut self,
        attacker: CombatantId,
        target: CombatantId,
        weapon_id: &str,
        hip_fire: bool,
        now: Tick,
    ) {
        let Some(weapon) = self.weapons.get(weapon_id) else {
            return;
        };
        let base_accuracy = weapon.base_accuracy();
        let base_damage = weapon.damage;
        let recovery_ticks = Tick::from(weapon.recovery_duration_ticks());
        let attacker_skill = self.combatants.get(&attacker).map(|c| c.skill).unwrap_or(0.0);

        // One uniform draw per resolution, taken before the target check
        // so the draw sequence is identical whether or not the target is
        // still standing.
        let draw = self.rng.next_uniform() as f32;

        let target_alive =
            self.combatants.get(&target).map(|c| c.is_alive()).unwrap_or(false);
        if !target_alive {
            // Target died or was removed mid-sequence: the attack
            // resolves against nothing. Reported, never thrown.
            log::debug!("{} resolved against absent target {}", attacker, target);
            self.events.record(CombatEvent::Miss { tick: now, attacker, target });
        } else {
            let target_skill = self.combatants.get(&target).map(|c| c.skill).unwrap_or(0.0);
            let p = hit_probability(base_accuracy, attacker_skill, target_skill, hip_fire);
            if draw < p {
                let roll = roll_damage(base_damage, self.rng.as_mut());
                let mut downed = false;
                if let Some(target_ref) = self.combatants.get_mut(&target) {
                    target_ref.health -= roll.amount;
                    downed = !target_ref.is_alive();
                }
                self.events.record(CombatEvent::Hit {
                    tick: now,
                    attacker,
                    target,
                    damage: roll.amount,
                    location: roll.location,
                    severity: roll.severity,
                });
                if downed {
                    self.events.record(CombatEvent::CombatantDowned { tick: now, combatant: target });
                    self.down_combatant(target);
                }
            } else {
                self.events.record(CombatEvent::Miss { tick: now, attacker, target });
            }
        }

        // Recovery window starts on resolution, hit or miss.
        if let Some(attacker_ref) = self.combatants.get_mut(&attacker) {
            attacker_ref.recovery_ends_at_tick = now + recovery_ticks;
        }
    }

    /// A downed combatant keeps its entry (late resolutions against it
    /// become no-ops) but leaves no scheduled work behind.
    fn down_combatant(&mut self, id: CombatantId) {
        let cancelled = self.scheduler.cancel_owned_by(id);
        if cancelled > 0 {
            log::debug!("cancelled {} scheduled events for downed {}", cancelled, id);
        }
        self.sequences.abort(id);
        if let Some(machine) = self.machines.get_mut(&id) {
            machine.clear_pending();
        }
    }
}
