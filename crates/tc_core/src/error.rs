use thiserror::Error;

/// Crate-level error type.
///
/// Business-level attack rejections (busy, recovering, out of range...)
/// are NOT errors; they are returned as [`crate::engine::RejectReason`]
/// values. `CombatError` covers configuration and serialization failures
/// that should stop a run before or during setup.
#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Invalid weapon definition '{weapon}': {reason}")]
    InvalidWeaponDefinition { weapon: String, reason: String },

    #[error("Unknown weapon id: {0}")]
    UnknownWeapon(String),

    #[error("Unknown combatant id: {0}")]
    UnknownCombatant(u32),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for CombatError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            CombatError::Deserialization(err.to_string())
        } else {
            CombatError::Serialization(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CombatError>;
