//! Arena combat core: boss encounter controllers, arena grid, projectiles, and the ECS host.

pub mod ai;
pub mod boss;
pub mod combat;
pub mod components;
pub mod error;
pub mod game_world;
pub mod grid;
pub mod projectile;
