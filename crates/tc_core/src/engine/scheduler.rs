//! Time-ordered event scheduling.
//!
//! The scheduler is the single shared mutable resource of the
//! simulation: a priority queue of discrete future actions ordered by
//! `(trigger_tick, sequence)`, with O(log n) insert and cancel. "Waiting"
//! in this engine is never blocked execution; it is always an entry in
//! this queue.
//!
//! Entries carry data payloads, not closures; the coordinator interprets
//! drained entries. Entries scheduled while a batch is being processed
//! become eligible on a later [`EventScheduler::advance_to`] call only,
//! so a same-tick cascade cannot loop forever.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::models::CombatantId;
use crate::Tick;

/// Identifier of a scheduled entry, unique within one scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

/// What to do when an entry comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPayload {
    /// Advance the owner's weapon state machine one state.
    AdvanceWeaponState { combatant: CombatantId },
}

#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub id: EventId,
    pub trigger_tick: Tick,
    /// Monotonic tiebreaker: equal-tick entries fire in insertion order.
    pub sequence: u64,
    pub owner: CombatantId,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EventKey {
    trigger_tick: Tick,
    sequence: u64,
    id: EventId,
}

/// Priority queue of scheduled events.
///
/// Cancellation is lazy: `cancel` removes the entry from the id map in
/// O(log n) equivalent work and the heap key is discarded when popped.
#[derive(Debug, Default)]
pub struct EventScheduler {
    heap: BinaryHeap<Reverse<EventKey>>,
    entries: HashMap<EventId, ScheduledEvent>,
    current_tick: Tick,
    next_id: u64,
    next_sequence: u64,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Number of scheduled (not yet fired, not cancelled) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry firing at `trigger_tick`.
    ///
    /// # Panics
    ///
    /// Scheduling into the past is a programming error and panics; it
    /// means an invariant was already violated upstream.
    pub fn schedule(
        &mut self,
        trigger_tick: Tick,
        owner: CombatantId,
        payload: EventPayload,
    ) -> EventId {
        assert!(
            trigger_tick >= self.current_tick,
            "scheduled into the past: trigger {} < current {}",
            trigger_tick,
            self.current_tick
        );
        let id = EventId(self.next_id);
        self.next_id += 1;
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.heap.push(Reverse(EventKey { trigger_tick, sequence, id }));
        self.entries
            .insert(id, ScheduledEvent { id, trigger_tick, sequence, owner, payload });
        log::trace!("scheduled event {:?} at tick {} for {}", id, trigger_tick, owner);
        id
    }

    /// Remove an entry before it fires.
    ///
    /// Returns `false` (a benign no-op, never an error) for unknown or
    /// already-fired ids; cancellation races are expected.
    pub fn cancel(&mut self, id: EventId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Cancel every entry owned by `owner`. Returns how many were live.
    pub fn cancel_owned_by(&mut self, owner: CombatantId) -> usize {
        let ids: Vec<EventId> = self
            .entries
            .values()
            .filter(|e| e.owner == owner)
            .map(|e| e.id)
            .collect();
        for id in &ids {
            self.entries.remove(id);
        }
        ids.len()
    }

    /// Advance the clock to `tick` and take every due entry, in strict
    /// `(trigger_tick, sequence)` order.
    ///
    /// The caller interprets the drained entries; anything it schedules
    /// while doing so fires on a later call, never within this pass.
    ///
    /// # Panics
    ///
    /// The driver must advance monotonically; a backwards clock panics.
    pub fn advance_to(&mut self, tick: Tick) -> Vec<ScheduledEvent> {
        assert!(
            tick >= self.current_tick,
            "clock moved backwards: {} < {}",
            tick,
            self.current_tick
        );
        self.current_tick = tick;

        let mut due = Vec::new();
        while let Some(Reverse(key)) = self.heap.peek().copied() {
            if key.trigger_tick > tick {
                break;
            }
            self.heap.pop();
            // Cancelled entries are still in the heap; skip them here.
            if let Some(event) = self.entries.remove(&key.id) {
                due.push(event);
            }
        }
        due
    }
}
