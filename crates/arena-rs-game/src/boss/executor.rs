//! Windup, activation, and active-stage behaviour for every attack kind.

use std::f32::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::ai::{pathfinding, spatial};
use crate::combat::{self, EntityPos, Target};
use crate::grid::Grid;
use crate::projectile::Projectile;

use super::attack::{ActiveAttack, AttackKind, AttackPayload, AttackStage, AttackState, TargetLock};
use super::catalog::AttackEntry;
use super::controller::BossController;
use super::events::{BossEvent, SpawnKind, SpawnRequest};
use super::phase::Phase;

/// Live minions (and decoys) allowed at once.
pub const MAX_MINIONS: usize = 8;

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

const SLAM_RADIUS: f32 = 90.0;
const SLAM_RADIUS_PHASE_TWO: f32 = 120.0;
const SLAM_DAMAGE: f32 = 1.5;
const SLAM_KNOCKBACK: f32 = 350.0;

const STOMP_RADIUS: f32 = 140.0;
const STOMP_RADIUS_PHASE_TWO: f32 = 180.0;
const STOMP_DAMAGE: f32 = 1.2;
const STOMP_KNOCKBACK: f32 = 420.0;

const SUMMON_OFFSET: f32 = 40.0;

const FAN_SPREAD: f32 = 0.6;
const FAN_SPEED: f32 = 220.0;
const PLASMA_SPREAD: f32 = 0.9;
const PLASMA_SPEEDS: [f32; 2] = [180.0, 260.0];
const BOLT_RADIUS: f32 = 6.0;
const FAN_DAMAGE: f32 = 0.6;

const VOLLEY_INTERVAL_MS: f32 = 250.0;
const VOLLEY_SPEED: f32 = 280.0;
const VOLLEY_DAMAGE: f32 = 0.7;

const RING_SPEED: f32 = 180.0;
const RING_DAMAGE: f32 = 0.5;
const SHOCKWAVE_SPEED: f32 = 120.0;
const SHOCKWAVE_RADIUS: f32 = 10.0;
const SHOCKWAVE_DAMAGE: f32 = 0.6;

const ROCKET_SPEED: f32 = 240.0;
const ROCKET_DAMAGE: f32 = 0.8;
const ROCKET_SPLASH_RADIUS: f32 = 56.0;
const ROCKET_SPLASH_DAMAGE: f32 = 0.9;
const BARRAGE_INTERVAL_MS: f32 = 300.0;

const BOMBARD_COUNT: usize = 5;
const BOMBARD_EXTRA_PHASE_TWO: usize = 3;
const BOMBARD_DELAY_MS: f32 = 500.0;
const BOMBARD_RADIUS: f32 = 48.0;
const BOMBARD_DAMAGE: f32 = 1.4;
const BOMBARD_KNOCKBACK: f32 = 300.0;

const LEAP_RADIUS: f32 = 100.0;
const LEAP_DAMAGE: f32 = 1.4;
const LEAP_KNOCKBACK: f32 = 380.0;

const LASER_ARC: f32 = 1.6;
const LASER_ARC_PHASE_TWO: f32 = 2.2;
const LASER_DURATION_MS: f32 = 1800.0;
const LASER_LENGTH: f32 = 640.0;
const LASER_HALF_WIDTH: f32 = 14.0;
const LASER_DAMAGE: f32 = 0.5;
/// Minimum gap between two beam hits on the target.
pub const LASER_HIT_COOLDOWN_MS: f32 = 200.0;

const EMP_RADIUS: f32 = 160.0;
const EMP_DAMAGE: f32 = 1.1;
const EMP_KNOCKBACK: f32 = 450.0;

/// Speed multiplier, duration, and contact damage multiplier of a dash.
fn dash_tuning(kind: AttackKind) -> (f32, f32, f32) {
    match kind {
        AttackKind::DashStrike => (5.0, 350.0, 1.6),
        _ => (3.5, 600.0, 1.3),
    }
}

/// Shot count by phase, `[phase 1, phase 2]`.
fn count_for(phase: Phase, counts: [u32; 2]) -> u32 {
    match phase {
        Phase::One => counts[0],
        Phase::Two => counts[1],
    }
}

/// What the attack does once its activation effect has fired.
enum Next {
    Active { timer_ms: f32, payload: AttackPayload },
    Recovery { payload: AttackPayload },
}

impl BossController {
    /// Start the windup for `entry`, capturing anything locked at windup start.
    pub(super) fn begin_windup(
        &mut self,
        entry: AttackEntry,
        target: &dyn Target,
        grid: Option<&dyn Grid>,
    ) {
        let duration_ms = entry.windup_ms * self.phase.tempo();
        let (tx, ty) = target.position();

        let payload = match entry.kind.profile().lock {
            TargetLock::PositionAtWindup => {
                self.events.push(BossEvent::LeapStart { to_x: tx, to_y: ty });
                AttackPayload::Leap { target: (tx, ty) }
            }
            TargetLock::PointsAtWindup => {
                let count = match self.phase {
                    Phase::One => BOMBARD_COUNT,
                    Phase::Two => BOMBARD_COUNT + BOMBARD_EXTRA_PHASE_TWO,
                };
                let targets = spatial::sample_bombardment_targets(
                    grid,
                    (tx, ty),
                    count,
                    self.arena_size,
                    &mut self.rng,
                );
                self.events.push(BossEvent::BombardmentTelegraph {
                    targets: targets.clone(),
                });
                AttackPayload::Bombardment { targets }
            }
            TargetLock::SweepAtWindup => {
                let direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let arc = match self.phase {
                    Phase::One => LASER_ARC,
                    Phase::Two => LASER_ARC_PHASE_TWO,
                };
                let aim = self.aim_at(tx, ty);
                let start_angle = aim - direction * arc / 2.0;
                AttackPayload::Sweep {
                    start_angle,
                    direction,
                    arc,
                    angle: start_angle,
                    duration_ms: LASER_DURATION_MS,
                }
            }
            TargetLock::None | TargetLock::DirectionAtActivation => AttackPayload::None,
        };

        self.attack = AttackState::Engaged(ActiveAttack {
            kind: entry.kind,
            stage: AttackStage::Windup,
            timer_ms: duration_ms,
            payload,
        });
        self.events.push(BossEvent::AttackWindup {
            kind: entry.kind,
            duration_ms,
        });
        debug!(kind = entry.kind.name(), duration_ms, phase = self.phase.number(), "attack windup");
    }

    pub(super) fn tick_windup(
        &mut self,
        dt_ms: f32,
        target: &mut dyn Target,
        grid: Option<&dyn Grid>,
        others: &[EntityPos],
        projectiles: &mut Vec<Projectile>,
    ) {
        let ready = match &mut self.attack {
            AttackState::Engaged(attack) => {
                attack.timer_ms -= dt_ms;
                attack.timer_ms <= 0.0
            }
            AttackState::Idle => false,
        };
        if ready {
            self.activate(target, grid, others, projectiles);
        }
    }

    /// Fire the activation effect and move to active or straight to recovery.
    fn activate(
        &mut self,
        target: &mut dyn Target,
        grid: Option<&dyn Grid>,
        others: &[EntityPos],
        projectiles: &mut Vec<Projectile>,
    ) {
        let AttackState::Engaged(attack) = std::mem::take(&mut self.attack) else {
            return;
        };
        let kind = attack.kind;
        let (tx, ty) = target.position();

        let next = match kind {
            AttackKind::Slam | AttackKind::Stomp | AttackKind::EmpBlast => {
                self.area_blast(kind, target);
                Next::Recovery {
                    payload: attack.payload,
                }
            }
            AttackKind::Charge | AttackKind::DashStrike => {
                let (dir_x, dir_y) = pathfinding::direction_toward(self.x, self.y, tx, ty)
                    .unwrap_or_else(|| pathfinding::unit_from_angle(self.facing));
                let (_, duration_ms, _) = dash_tuning(kind);
                self.events.push(if kind == AttackKind::Charge {
                    BossEvent::Charge { dir_x, dir_y }
                } else {
                    BossEvent::DashStrike { dir_x, dir_y }
                });
                Next::Active {
                    timer_ms: duration_ms,
                    payload: AttackPayload::Dash { dir_x, dir_y },
                }
            }
            AttackKind::Summon | AttackKind::Clone => {
                let spawn_kind = if kind == AttackKind::Summon {
                    SpawnKind::Minion
                } else {
                    SpawnKind::Decoy
                };
                let count = self.spawn_ring(spawn_kind, others.len());
                self.events.push(if kind == AttackKind::Summon {
                    BossEvent::Summon { count }
                } else {
                    BossEvent::Clone { count }
                });
                Next::Recovery {
                    payload: attack.payload,
                }
            }
            AttackKind::Fan => {
                let count = count_for(self.phase, [5, 7]);
                let aim = self.aim_at(tx, ty);
                let damage = self.stats.contact_damage * FAN_DAMAGE;
                for i in 0..count {
                    let angle = aim + spread_offset(i, count, FAN_SPREAD);
                    projectiles.push(Projectile::standard(
                        self.x, self.y, angle, FAN_SPEED, BOLT_RADIUS, damage,
                    ));
                }
                self.events.push(BossEvent::Fan { count });
                Next::Recovery {
                    payload: attack.payload,
                }
            }
            AttackKind::PlasmaFan => {
                let count = count_for(self.phase, [7, 9]);
                let aim = self.aim_at(tx, ty);
                let damage = self.stats.contact_damage * FAN_DAMAGE;
                for i in 0..count {
                    let angle = aim + spread_offset(i, count, PLASMA_SPREAD);
                    let speed = PLASMA_SPEEDS[i as usize % 2];
                    projectiles.push(Projectile::standard(
                        self.x,
                        self.y,
                        angle,
                        speed,
                        BOLT_RADIUS + 1.0,
                        damage,
                    ));
                }
                self.events.push(BossEvent::PlasmaFan { count });
                Next::Recovery {
                    payload: attack.payload,
                }
            }
            AttackKind::Ring | AttackKind::Shockwave => {
                let (counts, speed, radius, mult) = if kind == AttackKind::Ring {
                    ([12, 16], RING_SPEED, BOLT_RADIUS, RING_DAMAGE)
                } else {
                    ([16, 20], SHOCKWAVE_SPEED, SHOCKWAVE_RADIUS, SHOCKWAVE_DAMAGE)
                };
                let count = count_for(self.phase, counts);
                let damage = self.stats.contact_damage * mult;
                for i in 0..count {
                    let angle = self.facing + TAU * i as f32 / count as f32;
                    projectiles.push(Projectile::standard(
                        self.x, self.y, angle, speed, radius, damage,
                    ));
                }
                self.events.push(if kind == AttackKind::Ring {
                    BossEvent::Ring { count }
                } else {
                    BossEvent::Shockwave { count }
                });
                Next::Recovery {
                    payload: attack.payload,
                }
            }
            AttackKind::Volley => {
                let max = count_for(self.phase, [3, 5]);
                Next::Active {
                    timer_ms: max as f32 * VOLLEY_INTERVAL_MS,
                    payload: AttackPayload::Repeat {
                        fired: 0,
                        max,
                        until_next_ms: 0.0,
                    },
                }
            }
            AttackKind::Rocket => {
                let (aim_x, aim_y) = self.fire_rocket(&*target, projectiles);
                self.events.push(BossEvent::RocketFire { aim_x, aim_y });
                Next::Recovery {
                    payload: attack.payload,
                }
            }
            AttackKind::Barrage => {
                let max = count_for(self.phase, [4, 6]);
                self.fire_rocket(&*target, projectiles);
                self.events.push(BossEvent::BarrageShot { shot: 1 });
                Next::Active {
                    // Half an interval of slack so the last shot lands before the stage ends.
                    timer_ms: (max - 1) as f32 * BARRAGE_INTERVAL_MS + BARRAGE_INTERVAL_MS / 2.0,
                    payload: AttackPayload::Repeat {
                        fired: 1,
                        max,
                        until_next_ms: BARRAGE_INTERVAL_MS,
                    },
                }
            }
            AttackKind::Bombardment => Next::Active {
                timer_ms: BOMBARD_DELAY_MS,
                payload: attack.payload,
            },
            AttackKind::Leap => {
                if let AttackPayload::Leap { target: (lx, ly) } = attack.payload {
                    self.x = lx;
                    self.y = ly;
                    self.settle(grid);
                }
                let radius = LEAP_RADIUS;
                let hit = combat::apply_area_hit(
                    target,
                    self.x,
                    self.y,
                    radius,
                    self.stats.contact_damage * LEAP_DAMAGE,
                    LEAP_KNOCKBACK,
                );
                self.events.push(BossEvent::LeapLand {
                    x: self.x,
                    y: self.y,
                    radius,
                    hit,
                });
                Next::Recovery {
                    payload: attack.payload,
                }
            }
            AttackKind::LaserSweep => {
                let (timer_ms, start_angle) = match attack.payload {
                    AttackPayload::Sweep {
                        duration_ms,
                        start_angle,
                        ..
                    } => (duration_ms, start_angle),
                    _ => (LASER_DURATION_MS, self.facing),
                };
                self.events.push(BossEvent::LaserStart { angle: start_angle });
                Next::Active {
                    timer_ms,
                    payload: attack.payload,
                }
            }
        };

        let (stage, timer_ms, payload) = match next {
            Next::Active { timer_ms, payload } => (AttackStage::Active, timer_ms, payload),
            Next::Recovery { payload } => {
                (AttackStage::Recovery, kind.profile().recovery_ms, payload)
            }
        };
        debug!(kind = kind.name(), stage = ?stage, "attack activated");
        self.attack = AttackState::Engaged(ActiveAttack {
            kind,
            stage,
            timer_ms,
            payload,
        });
    }

    pub(super) fn tick_active(
        &mut self,
        dt: f32,
        target: &mut dyn Target,
        projectiles: &mut Vec<Projectile>,
    ) {
        let AttackState::Engaged(mut attack) = std::mem::take(&mut self.attack) else {
            return;
        };
        let dt_ms = dt * 1000.0;
        attack.timer_ms -= dt_ms;
        let kind = attack.kind;

        match &mut attack.payload {
            AttackPayload::Dash { dir_x, dir_y } => {
                let (speed_mult, _, _) = dash_tuning(kind);
                let step = self.stats.speed * speed_mult * dt;
                self.x += *dir_x * step;
                self.y += *dir_y * step;
            }
            AttackPayload::Repeat {
                fired,
                max,
                until_next_ms,
            } => {
                *until_next_ms -= dt_ms;
                while *until_next_ms <= 0.0 && *fired < *max {
                    *fired += 1;
                    self.fire_repeat_shot(kind, *fired, &*target, projectiles);
                    *until_next_ms += match kind {
                        AttackKind::Barrage => BARRAGE_INTERVAL_MS,
                        _ => VOLLEY_INTERVAL_MS,
                    };
                }
            }
            AttackPayload::Sweep {
                start_angle,
                direction,
                arc,
                angle,
                duration_ms,
            } => {
                let progress = if *duration_ms > 0.0 {
                    1.0 - attack.timer_ms / *duration_ms
                } else {
                    1.0
                };
                *angle = spatial::sweep_angle(*start_angle, *direction, *arc, progress);
                self.facing = *angle;
                self.beam_check(*angle, target);
            }
            AttackPayload::None | AttackPayload::Bombardment { .. } | AttackPayload::Leap { .. } => {}
        }

        if attack.timer_ms <= 0.0 {
            match (&attack.payload, kind) {
                (AttackPayload::Bombardment { targets }, _) => {
                    self.detonate_bombardment(targets.clone(), target);
                }
                (_, AttackKind::LaserSweep) => self.events.push(BossEvent::LaserEnd),
                _ => {}
            }
            attack.stage = AttackStage::Recovery;
            attack.timer_ms = kind.profile().recovery_ms;
            debug!(kind = kind.name(), "attack recovering");
        }

        self.attack = AttackState::Engaged(attack);
    }

    /// Body contact damage, boosted while a dash is in flight.
    pub(super) fn current_contact_damage(&self) -> f32 {
        match &self.attack {
            AttackState::Engaged(ActiveAttack {
                kind,
                stage: AttackStage::Active,
                payload: AttackPayload::Dash { .. },
                ..
            }) => self.stats.contact_damage * dash_tuning(*kind).2,
            _ => self.stats.contact_damage,
        }
    }

    fn aim_at(&self, tx: f32, ty: f32) -> f32 {
        if pathfinding::direction_toward(self.x, self.y, tx, ty).is_some() {
            pathfinding::angle_toward(self.x, self.y, tx, ty)
        } else {
            self.facing
        }
    }

    fn area_blast(&mut self, kind: AttackKind, target: &mut dyn Target) {
        let phase_two = self.phase == Phase::Two;
        let (radius, mult, force) = match kind {
            AttackKind::Slam if phase_two => (SLAM_RADIUS_PHASE_TWO, SLAM_DAMAGE, SLAM_KNOCKBACK),
            AttackKind::Slam => (SLAM_RADIUS, SLAM_DAMAGE, SLAM_KNOCKBACK),
            AttackKind::Stomp if phase_two => (STOMP_RADIUS_PHASE_TWO, STOMP_DAMAGE, STOMP_KNOCKBACK),
            AttackKind::Stomp => (STOMP_RADIUS, STOMP_DAMAGE, STOMP_KNOCKBACK),
            _ => (EMP_RADIUS, EMP_DAMAGE, EMP_KNOCKBACK),
        };
        let (x, y) = (self.x, self.y);
        let hit = combat::apply_area_hit(
            target,
            x,
            y,
            radius,
            self.stats.contact_damage * mult,
            force,
        );
        self.events.push(match kind {
            AttackKind::Slam => BossEvent::Slam { x, y, radius, hit },
            AttackKind::Stomp => BossEvent::Stomp { x, y, radius, hit },
            _ => BossEvent::EmpBlast { x, y, radius, hit },
        });
    }

    /// Queue spawn requests evenly around the boss. Returns how many were queued.
    fn spawn_ring(&mut self, kind: SpawnKind, live: usize) -> u32 {
        let wanted = count_for(self.phase, [2, 3]) as usize;
        let count = wanted.min(MAX_MINIONS.saturating_sub(live));
        let offset = self.stats.collision_radius + SUMMON_OFFSET;
        for i in 0..count {
            let angle = self.facing + TAU * i as f32 / count as f32;
            let (dx, dy) = pathfinding::unit_from_angle(angle);
            self.pending_spawns.push(SpawnRequest {
                x: self.x + dx * offset,
                y: self.y + dy * offset,
                kind,
            });
        }
        if count < wanted {
            debug!(wanted, count, live, "spawn capped");
        }
        count as u32
    }

    /// Fire a rocket at where the target will be when it arrives. Returns the aim point.
    fn fire_rocket(&mut self, target: &dyn Target, projectiles: &mut Vec<Projectile>) -> (f32, f32) {
        let (tx, ty) = target.position();
        let (vx, vy) = target.velocity();
        let flight = pathfinding::distance(self.x, self.y, tx, ty) / ROCKET_SPEED;
        let (ax, ay) = (tx + vx * flight, ty + vy * flight);
        let angle = self.aim_at(ax, ay);
        projectiles.push(Projectile::rocket(
            self.x,
            self.y,
            angle,
            ROCKET_SPEED,
            self.stats.contact_damage * ROCKET_DAMAGE,
            ROCKET_SPLASH_RADIUS,
            self.stats.contact_damage * ROCKET_SPLASH_DAMAGE,
        ));
        (ax, ay)
    }

    fn fire_repeat_shot(
        &mut self,
        kind: AttackKind,
        shot: u32,
        target: &dyn Target,
        projectiles: &mut Vec<Projectile>,
    ) {
        match kind {
            AttackKind::Barrage => {
                self.fire_rocket(target, projectiles);
                self.events.push(BossEvent::BarrageShot { shot });
            }
            _ => {
                let (tx, ty) = target.position();
                let angle = self.aim_at(tx, ty);
                projectiles.push(Projectile::standard(
                    self.x,
                    self.y,
                    angle,
                    VOLLEY_SPEED,
                    BOLT_RADIUS,
                    self.stats.contact_damage * VOLLEY_DAMAGE,
                ));
                self.events.push(BossEvent::VolleyShot { shot });
            }
        }
    }

    fn beam_check(&mut self, angle: f32, target: &mut dyn Target) {
        if self.beam_cooldown_ms > 0.0 {
            return;
        }
        let (dx, dy) = pathfinding::unit_from_angle(angle);
        let start = (self.x, self.y);
        let end = (self.x + dx * LASER_LENGTH, self.y + dy * LASER_LENGTH);
        if !spatial::beam_hits_circle(start, end, target.position(), target.radius(), LASER_HALF_WIDTH)
        {
            return;
        }
        let damage = self.stats.contact_damage * LASER_DAMAGE;
        target.take_damage(damage);
        self.beam_cooldown_ms = LASER_HIT_COOLDOWN_MS;
        self.events.push(BossEvent::LaserHit { damage });
    }

    /// Every locked point explodes at once. The target is hit at most once.
    fn detonate_bombardment(&mut self, targets: Vec<(f32, f32)>, target: &mut dyn Target) {
        let (tx, ty) = target.position();
        let reach = BOMBARD_RADIUS + target.radius();
        let nearest = targets
            .iter()
            .copied()
            .map(|p| (p, pathfinding::distance_sq(p.0, p.1, tx, ty)))
            .filter(|&(_, d)| d <= reach * reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p);

        let hit = match nearest {
            Some((px, py)) => combat::apply_area_hit(
                target,
                px,
                py,
                BOMBARD_RADIUS,
                self.stats.contact_damage * BOMBARD_DAMAGE,
                BOMBARD_KNOCKBACK,
            ),
            None => false,
        };
        self.events.push(BossEvent::BombardmentImpact { targets, hit });
    }
}

/// Angular offset of shot `i` of `count` spread evenly across `spread` radians.
fn spread_offset(i: u32, count: u32, spread: f32) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    -spread / 2.0 + spread * i as f32 / (count - 1) as f32
}
