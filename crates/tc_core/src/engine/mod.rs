//! Combat Simulation Engine
//!
//! Tick-driven, single-threaded, cooperative. One logical clock is
//! advanced by an external driver; all "waiting" is a scheduled future
//! event, never blocked execution. The layers:
//!
//! - L1: `probability.rs` - stateless hit/damage math
//! - L2: `state_machine.rs` / `scheduler.rs` - weapon state graphs and
//!   the time-ordered event queue
//! - L3: `attack.rs` / `coordinator.rs` - stateful attack sequencing and
//!   cross-combatant resolution
//!
//! `skirmish.rs` wraps the layers into a plan → run → result driver for
//! scripted scenarios, the JSON API, and deterministic end-to-end tests.

pub mod attack;
pub mod coordinator;
pub mod events;
pub mod probability;
pub mod rng;
pub mod scheduler;
pub mod skirmish;
pub mod state_machine;

pub use attack::{AttackDecision, AttackSequenceManager, RejectReason};
pub use coordinator::CombatCoordinator;
pub use events::{CombatEvent, EventLog};
pub use probability::{hit_probability, roll_damage, DamageRoll, HitLocation, HIP_FIRE_PENALTY};
pub use rng::{RandomProvider, SimRng};
pub use scheduler::{EventId, EventPayload, EventScheduler, ScheduledEvent};
pub use skirmish::{CombatantSpec, ScriptedCommand, SkirmishEngine, SkirmishPlan, SkirmishResult};
pub use state_machine::{next_state, WeaponStateMachine};

/// Simulation tick rate assumed by the default catalog's durations.
pub const TICKS_PER_SECOND: u32 = 60;
