//! Hostile projectile descriptors and their per-tick physics.

use serde::Serialize;

use crate::ai::pathfinding;
use crate::grid::Grid;

/// Default lifetime for boss projectiles, in milliseconds.
pub const PROJECTILE_LIFETIME_MS: f32 = 4000.0;

/// Projectile variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Damages only what it touches.
    Standard,
    /// Explodes on impact or expiry, damaging everything within `splash_radius`.
    Rocket {
        splash_radius: f32,
        splash_damage: f32,
    },
}

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    /// Velocity in units/second.
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    /// Direct-hit damage.
    pub damage: f32,
    /// Remaining lifetime in milliseconds.
    pub lifetime_ms: f32,
    pub kind: ProjectileKind,
}

/// What happened to a projectile during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Still flying.
    Flying,
    /// Lifetime ran out in open space.
    Expired,
    /// Centre entered a wall tile.
    HitWall,
}

impl Projectile {
    /// A standard projectile fired along `angle` (radians).
    pub fn standard(x: f32, y: f32, angle: f32, speed: f32, radius: f32, damage: f32) -> Self {
        let (dx, dy) = pathfinding::unit_from_angle(angle);
        Self {
            x,
            y,
            vx: dx * speed,
            vy: dy * speed,
            radius,
            damage,
            lifetime_ms: PROJECTILE_LIFETIME_MS,
            kind: ProjectileKind::Standard,
        }
    }

    /// A rocket fired along `angle` that splashes on impact.
    pub fn rocket(
        x: f32,
        y: f32,
        angle: f32,
        speed: f32,
        damage: f32,
        splash_radius: f32,
        splash_damage: f32,
    ) -> Self {
        Self {
            kind: ProjectileKind::Rocket {
                splash_radius,
                splash_damage,
            },
            ..Self::standard(x, y, angle, speed, 8.0, damage)
        }
    }

    pub fn is_rocket(&self) -> bool {
        matches!(self.kind, ProjectileKind::Rocket { .. })
    }

    /// Direct-hit test against a circle.
    pub fn hits_circle(&self, cx: f32, cy: f32, radius: f32) -> bool {
        let reach = self.radius + radius;
        pathfinding::distance_sq(self.x, self.y, cx, cy) <= reach * reach
    }

    /// Splash damage a circle at `(cx, cy)` takes when this projectile detonates.
    ///
    /// Zero for standard projectiles or when outside the blast.
    pub fn splash_damage_to(&self, cx: f32, cy: f32, radius: f32) -> f32 {
        match self.kind {
            ProjectileKind::Rocket {
                splash_radius,
                splash_damage,
            } => {
                let reach = splash_radius + radius;
                if pathfinding::distance_sq(self.x, self.y, cx, cy) <= reach * reach {
                    splash_damage
                } else {
                    0.0
                }
            }
            ProjectileKind::Standard => 0.0,
        }
    }
}

/// Advance one projectile by `dt` seconds.
pub fn step_projectile(p: &mut Projectile, dt: f32, grid: Option<&dyn Grid>) -> StepOutcome {
    p.x += p.vx * dt;
    p.y += p.vy * dt;
    p.lifetime_ms -= dt * 1000.0;

    if let Some(grid) = grid {
        if grid.is_wall_at(p.x, p.y) {
            return StepOutcome::HitWall;
        }
    }
    if p.lifetime_ms <= 0.0 {
        return StepOutcome::Expired;
    }
    StepOutcome::Flying
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;

    #[test]
    fn standard_moves_along_angle() {
        let mut p = Projectile::standard(100.0, 100.0, 0.0, 200.0, 6.0, 10.0);
        assert_eq!(step_projectile(&mut p, 0.5, None), StepOutcome::Flying);
        assert!((p.x - 200.0).abs() < 0.01);
        assert!((p.y - 100.0).abs() < 0.01);
    }

    #[test]
    fn expires_after_lifetime() {
        let mut p = Projectile::standard(0.0, 0.0, 0.0, 0.0, 6.0, 10.0);
        p.lifetime_ms = 10.0;
        assert_eq!(step_projectile(&mut p, 0.016, None), StepOutcome::Expired);
    }

    #[test]
    fn stops_at_wall() {
        let grid = TileGrid::open_room(10, 10, 32.0);
        let mut p = Projectile::standard(40.0, 160.0, std::f32::consts::PI, 400.0, 6.0, 10.0);
        assert_eq!(step_projectile(&mut p, 0.05, Some(&grid)), StepOutcome::HitWall);
    }

    #[test]
    fn rocket_splash() {
        let r = Projectile::rocket(0.0, 0.0, 0.0, 300.0, 20.0, 60.0, 15.0);
        assert!(r.is_rocket());
        assert!((r.splash_damage_to(50.0, 0.0, 12.0) - 15.0).abs() < 0.001);
        assert_eq!(r.splash_damage_to(100.0, 0.0, 12.0), 0.0);
    }

    #[test]
    fn standard_has_no_splash() {
        let p = Projectile::standard(0.0, 0.0, 0.0, 300.0, 6.0, 10.0);
        assert_eq!(p.splash_damage_to(0.0, 0.0, 12.0), 0.0);
        assert!(p.hits_circle(10.0, 0.0, 12.0));
    }
}
