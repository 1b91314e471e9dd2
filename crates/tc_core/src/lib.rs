//! # tc_core - Deterministic Tactical Combat Engine
//!
//! This library provides a tick-driven tactical combat core with weapon
//! state machines, a deterministic event scheduler, and a JSON API for
//! easy integration with a rendering front end.
//!
//! ## Features
//! - 100% deterministic simulation (same seed = same result)
//! - Data-driven weapon handling graphs validated at load time
//! - Explicit attack rejection reasons instead of silently dropped input
//! - JSON API for easy integration

// Allow unused code for features under development
#![allow(dead_code)]

pub mod api;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod save;

// Re-export main API functions
pub use api::{simulate_skirmish_json, SkirmishRequest, SkirmishResponse};
pub use error::{CombatError, Result};

// Re-export engine types
pub use engine::{
    AttackDecision, CombatCoordinator, CombatEvent, EventScheduler, RandomProvider, RejectReason,
    SimRng, SkirmishEngine, SkirmishPlan, SkirmishResult, WeaponStateMachine, TICKS_PER_SECOND,
};

// Re-export model types
pub use models::{
    Combatant, CombatantId, FiringPreference, WeaponClass, WeaponDefinition, WeaponStateId,
};

// Re-export save system
pub use save::{CombatSave, SaveError};

/// Simulation clock unit. Sixty ticks per second of game time.
pub type Tick = u64;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sha2::{Digest, Sha256};

    fn duel_request(seed: u64) -> serde_json::Value {
        json!({
            "schema_version": 1,
            "seed": seed,
            "max_ticks": 2000,
            "combatants": [
                {"id": 1, "name": "Vance", "skill": 70.0, "health": 100.0,
                 "position": [0.0, 0.0], "weapon": "pistol", "aimed_fire": true},
                {"id": 2, "name": "Reyes", "skill": 55.0, "health": 100.0,
                 "position": [12.0, 0.0], "weapon": "pistol", "aimed_fire": true}
            ],
            "commands": [
                {"tick": 0, "attacker": 1, "target": 2},
                {"tick": 0, "attacker": 2, "target": 1}
            ]
        })
    }

    #[test]
    fn test_basic_simulation() {
        let result = simulate_skirmish_json(&duel_request(42).to_string());
        assert!(result.is_ok(), "Simulation should succeed");

        let parsed: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(parsed["schema_version"], 1);
        assert!(parsed["ticks_run"].is_number());
        assert!(parsed["combatants"].is_array());
        assert!(!parsed["events"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_determinism() {
        let request_str = duel_request(999).to_string();

        let result1 = simulate_skirmish_json(&request_str).unwrap();
        let result2 = simulate_skirmish_json(&request_str).unwrap();

        assert_eq!(result1, result2, "Same seed should produce same result");
    }

    #[test]
    fn test_event_log_determinism_sha256() {
        let request_str = duel_request(123456).to_string();

        let result1 = simulate_skirmish_json(&request_str).unwrap();
        let result2 = simulate_skirmish_json(&request_str).unwrap();

        fn sha256_hex(bytes: &[u8]) -> String {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let digest = hasher.finalize();
            let mut out = String::with_capacity(digest.len() * 2);
            for b in digest {
                out.push_str(&format!("{:02x}", b));
            }
            out
        }

        assert_eq!(
            sha256_hex(result1.as_bytes()),
            sha256_hex(result2.as_bytes()),
            "Same seed should produce identical event log sha256"
        );
    }

    #[test]
    fn test_different_seeds_diverge() {
        // Any hit carries a severity draw unique to its seed, so a run
        // of seeds cannot all produce the same event stream.
        let outputs: Vec<String> = (0..10u64)
            .map(|seed| simulate_skirmish_json(&duel_request(seed).to_string()).unwrap())
            .collect();
        let distinct: std::collections::HashSet<&String> = outputs.iter().collect();
        assert!(distinct.len() > 1, "Different seeds should diverge");
    }
}
