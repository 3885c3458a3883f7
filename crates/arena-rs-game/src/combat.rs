//! Combat primitives shared by bosses and the arena host: targets, overlap tests, knockback.

use crate::ai::pathfinding;

/// Something a boss can hit.
pub trait Target {
    /// World position of the target's centre.
    fn position(&self) -> (f32, f32);

    /// Collision radius.
    fn radius(&self) -> f32;

    /// Current velocity in units/second, used for lead prediction.
    fn velocity(&self) -> (f32, f32) {
        (0.0, 0.0)
    }

    /// Apply raw damage.
    fn take_damage(&mut self, amount: f32);

    /// Apply a knockback impulse (units/second).
    fn apply_knockback(&mut self, _kx: f32, _ky: f32) {}
}

/// Position and radius of another live entity in the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityPos {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Circle vs circle overlap.
pub fn circles_overlap(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let reach = ar + br;
    pathfinding::distance_sq(ax, ay, bx, by) < reach * reach
}

/// Knockback impulse of magnitude `force` pushing `to` away from `from`.
///
/// Zero when the two points coincide.
pub fn knockback_vector(from_x: f32, from_y: f32, to_x: f32, to_y: f32, force: f32) -> (f32, f32) {
    match pathfinding::direction_toward(from_x, from_y, to_x, to_y) {
        Some((nx, ny)) => (nx * force, ny * force),
        None => (0.0, 0.0),
    }
}

/// Damage and knock back `target` if it is within `radius` of `(cx, cy)`.
///
/// The target's own radius extends the reach. Returns `true` on a hit.
pub fn apply_area_hit(
    target: &mut dyn Target,
    cx: f32,
    cy: f32,
    radius: f32,
    damage: f32,
    force: f32,
) -> bool {
    let (tx, ty) = target.position();
    let reach = radius + target.radius();
    if pathfinding::distance_sq(cx, cy, tx, ty) > reach * reach {
        return false;
    }
    target.take_damage(damage);
    let (kx, ky) = knockback_vector(cx, cy, tx, ty, force);
    target.apply_knockback(kx, ky);
    true
}
