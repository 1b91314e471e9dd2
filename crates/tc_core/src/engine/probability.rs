//! Hit and damage math for attack resolution.
//!
//! All functions are pure except for the draws they take from the
//! provided random source. This keeps every probability testable without
//! a full engine.

use serde::{Deserialize, Serialize};

use super::rng::RandomProvider;

// ============================================================================
// Tuning constants
// ============================================================================

/// Fixed accuracy penalty for firing from `pointed_from_hip`, applied on
/// top of all other modifiers.
pub const HIP_FIRE_PENALTY: f32 = 0.15;

/// Weight of the attacker-vs-target skill edge (full 100-point edge
/// shifts the hit chance by this much).
pub const SKILL_EDGE_WEIGHT: f32 = 0.3;

/// Hit probability clamp. No attack is a guaranteed hit or miss.
pub const MIN_HIT_PROBABILITY: f32 = 0.05;
pub const MAX_HIT_PROBABILITY: f32 = 0.95;

/// Damage severity spread (multiplier around 1.0).
pub const SEVERITY_STD_DEV: f64 = 0.2;
pub const SEVERITY_MIN: f32 = 0.4;
pub const SEVERITY_MAX: f32 = 1.8;

// ============================================================================
// Hit probability
// ============================================================================

/// Effective hit probability for one attack.
///
/// `hip_fire` is true only for ranged attacks executed from
/// `pointed_from_hip`; melee attacks always pass false.
pub fn hit_probability(
    weapon_accuracy: f32,
    attacker_skill: f32,
    target_skill: f32,
    hip_fire: bool,
) -> f32 {
    let skill_edge = (attacker_skill - target_skill) / 100.0 * SKILL_EDGE_WEIGHT;
    let mut p = weapon_accuracy + skill_edge;
    if hip_fire {
        p -= HIP_FIRE_PENALTY;
    }
    p.clamp(MIN_HIT_PROBABILITY, MAX_HIT_PROBABILITY)
}

// ============================================================================
// Damage
// ============================================================================

/// Body location a hit lands on, with its damage multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitLocation {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl HitLocation {
    pub fn damage_multiplier(self) -> f32 {
        match self {
            HitLocation::Head => 2.0,
            HitLocation::Torso => 1.0,
            HitLocation::LeftArm | HitLocation::RightArm => 0.7,
            HitLocation::LeftLeg | HitLocation::RightLeg => 0.8,
        }
    }
}

/// One resolved hit: final amount plus the rolls that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub amount: f32,
    pub location: HitLocation,
    pub severity: f32,
}

/// Weighted location table: torso-heavy, head rare.
fn roll_location(rng: &mut dyn RandomProvider) -> HitLocation {
    match rng.next_int(10) {
        0 => HitLocation::Head,
        1..=5 => HitLocation::Torso,
        6 => HitLocation::LeftArm,
        7 => HitLocation::RightArm,
        8 => HitLocation::LeftLeg,
        _ => HitLocation::RightLeg,
    }
}

/// Roll location and severity for a hit with the given base damage.
pub fn roll_damage(base_damage: f32, rng: &mut dyn RandomProvider) -> DamageRoll {
    let location = roll_location(rng);
    let severity =
        (rng.next_normal(1.0, SEVERITY_STD_DEV) as f32).clamp(SEVERITY_MIN, SEVERITY_MAX);
    DamageRoll {
        amount: base_damage * location.damage_multiplier() * severity,
        location,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::SimRng;

    #[test]
    fn test_hip_fire_penalty_is_exactly_fixed_offset() {
        let aimed = hit_probability(0.7, 60.0, 60.0, false);
        let hip = hit_probability(0.7, 60.0, 60.0, true);
        assert!((aimed - hip - HIP_FIRE_PENALTY).abs() < 1e-6);
    }

    #[test]
    fn test_skill_edge_shifts_probability() {
        let even = hit_probability(0.5, 50.0, 50.0, false);
        let better = hit_probability(0.5, 90.0, 50.0, false);
        let worse = hit_probability(0.5, 50.0, 90.0, false);
        assert!(better > even);
        assert!(worse < even);
        assert!((better - even - 0.4 * SKILL_EDGE_WEIGHT).abs() < 1e-6);
    }

    #[test]
    fn test_probability_clamped() {
        assert_eq!(hit_probability(1.5, 100.0, 0.0, false), MAX_HIT_PROBABILITY);
        assert_eq!(hit_probability(0.0, 0.0, 100.0, true), MIN_HIT_PROBABILITY);
    }

    #[test]
    fn test_damage_roll_within_bounds() {
        let mut rng = SimRng::seeded(11);
        for _ in 0..200 {
            let roll = roll_damage(25.0, &mut rng);
            let max = 25.0 * 2.0 * SEVERITY_MAX;
            assert!(roll.amount > 0.0 && roll.amount <= max, "amount {}", roll.amount);
            assert!((SEVERITY_MIN..=SEVERITY_MAX).contains(&roll.severity));
        }
    }

    #[test]
    fn test_location_table_covers_all_locations() {
        let mut rng = SimRng::seeded(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(format!("{:?}", roll_location(&mut rng)));
        }
        assert_eq!(seen.len(), 6);
    }
}
