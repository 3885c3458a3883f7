//! Boss encounters: archetypes, stat scaling, the attack state machine, and the per-boss controller.

pub mod attack;
pub mod catalog;
pub mod controller;
pub mod events;
mod executor;
pub mod phase;
pub mod scaling;

pub use attack::{AttackKind, AttackStage};
pub use catalog::Archetype;
pub use controller::{BossController, BossSpawn};
pub use events::{damage_channel, BossEvent, DamageEvent, DamageFeed, DamageSink, SpawnKind, SpawnRequest};
pub use executor::MAX_MINIONS;
pub use phase::Phase;
