//! String-in/string-out skirmish API.
//!
//! One function, schema-versioned JSON both ways, so host engines embed
//! the simulation without linking against any of the internal types.

use serde::{Deserialize, Serialize};

use crate::engine::skirmish::{
    CombatantSpec, ScriptedCommand, SkirmishEngine, SkirmishPlan, SkirmishResult,
};
use crate::models::WeaponDefinition;
use crate::SCHEMA_VERSION;

#[derive(Debug, Clone, Deserialize)]
pub struct SkirmishRequest {
    pub schema_version: u8,
    #[serde(default)]
    pub seed: Option<u64>,
    pub max_ticks: u64,
    pub combatants: Vec<CombatantSpec>,
    #[serde(default)]
    pub commands: Vec<ScriptedCommand>,
    #[serde(default)]
    pub extra_weapons: Vec<WeaponDefinition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkirmishResponse {
    pub schema_version: u8,
    #[serde(flatten)]
    pub result: SkirmishResult,
}

/// Run one skirmish described by a JSON request.
///
/// Errors are returned as plain strings for the host engine to surface;
/// they are always setup errors (bad JSON, bad schema, bad scenario),
/// never mid-run failures.
pub fn simulate_skirmish_json(request_json: &str) -> Result<String, String> {
    let request: SkirmishRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    if request.schema_version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", request.schema_version));
    }

    let plan = SkirmishPlan {
        seed: request.seed,
        max_ticks: request.max_ticks,
        combatants: request.combatants,
        commands: request.commands,
        extra_weapons: request.extra_weapons,
    };

    let engine = SkirmishEngine::new(plan).map_err(|e| format!("Invalid scenario: {}", e))?;
    let result = engine.run();

    let response = SkirmishResponse { schema_version: SCHEMA_VERSION, result };
    serde_json::to_string(&response).map_err(|e| format!("Serialization failed: {}", e))
}
