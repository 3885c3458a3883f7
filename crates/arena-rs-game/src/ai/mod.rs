//! Boss AI helpers: steering, weighted selection, and spatial targeting.

pub mod pathfinding;
pub mod selection;
pub mod spatial;
