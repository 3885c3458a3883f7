//! ECS components for arena entities (player, bosses, minions).

use bevy_ecs::prelude::*;

use crate::boss::{BossController, SpawnKind};

/// Stable identity for an entity, used by callers outside the ECS.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Position in world units.
#[derive(Component, Debug, Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Intended movement in units/second.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

/// Knockback drift in units/second, decays every tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Knockback {
    pub x: f32,
    pub y: f32,
}

/// Health points.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Collision circle radius.
#[derive(Component, Debug, Clone, Copy)]
pub struct Radius(pub f32);

/// Marker: this entity is the player.
#[derive(Component, Debug)]
pub struct Player;

/// A boss and its encounter controller.
#[derive(Component, Debug)]
pub struct BossBrain(pub BossController);

/// A summoned minion or decoy. Inert: it only occupies space and soaks damage.
#[derive(Component, Debug, Clone, Copy)]
pub struct Minion {
    pub kind: SpawnKind,
    /// Id of the boss that summoned it.
    pub owner: u64,
}

/// Marker: this entity is dead (pending cleanup).
#[derive(Component, Debug)]
pub struct Dead;
