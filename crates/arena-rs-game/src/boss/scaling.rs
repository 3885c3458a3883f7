//! Stat derivation from archetype, encounter index, and stage number.

use super::catalog::ArchetypeDef;

pub const BASE_HEALTH: f32 = 400.0;
pub const BASE_SPEED: f32 = 55.0;
pub const BASE_DAMAGE: f32 = 15.0;

/// Health growth per boss already defeated this session.
pub const ENCOUNTER_HP_SCALE: f32 = 0.55;
/// Health growth per stage.
pub const STAGE_HP_SCALE: f32 = 0.02;
pub const ENCOUNTER_DAMAGE_SCALE: f32 = 0.25;
pub const STAGE_DAMAGE_SCALE: f32 = 0.03;
pub const ENCOUNTER_SPEED_SCALE: f32 = 0.05;
pub const STAGE_SPEED_SCALE: f32 = 0.01;

/// Stats fixed at spawn time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossStats {
    /// Whole number of hit points.
    pub max_health: f32,
    /// Movement speed in units/second (fractional).
    pub speed: f32,
    /// Whole-number damage dealt on body contact.
    pub contact_damage: f32,
    pub collision_radius: f32,
}

fn scale(encounter_index: u32, stage: u32, per_encounter: f32, per_stage: f32) -> f32 {
    (1.0 + encounter_index as f32 * per_encounter) * (1.0 + stage as f32 * per_stage)
}

pub fn hp_scale(encounter_index: u32, stage: u32) -> f32 {
    scale(encounter_index, stage, ENCOUNTER_HP_SCALE, STAGE_HP_SCALE)
}

pub fn damage_scale(encounter_index: u32, stage: u32) -> f32 {
    scale(encounter_index, stage, ENCOUNTER_DAMAGE_SCALE, STAGE_DAMAGE_SCALE)
}

pub fn speed_scale(encounter_index: u32, stage: u32) -> f32 {
    scale(encounter_index, stage, ENCOUNTER_SPEED_SCALE, STAGE_SPEED_SCALE)
}

/// Derive a boss's stats. Health and contact damage are floored; speed stays fractional.
pub fn derive_stats(def: &ArchetypeDef, encounter_index: u32, stage: u32) -> BossStats {
    BossStats {
        max_health: (BASE_HEALTH * def.health_mult * hp_scale(encounter_index, stage)).floor(),
        speed: BASE_SPEED * def.speed_mult * speed_scale(encounter_index, stage),
        contact_damage: (BASE_DAMAGE * def.damage_mult * damage_scale(encounter_index, stage))
            .floor(),
        collision_radius: def.collision_radius,
    }
}
