//! Per-boss controller: owns position, health, and timers, and runs one tick of the encounter.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::ai::pathfinding;
use crate::ai::selection;
use crate::combat::{self, EntityPos, Target};
use crate::grid::{self, Grid};
use crate::projectile::Projectile;

use super::attack::{AttackKind, AttackPayload, AttackStage, AttackState};
use super::catalog::{Archetype, ArchetypeDef};
use super::events::{BossEvent, DamageEvent, DamageSink, SpawnRequest};
use super::phase::{Phase, SPAWN_COOLDOWN_FRACTION};
use super::scaling::{self, BossStats};

/// The boss stops closing in once the target is this far outside its body.
pub const IDLE_APPROACH_MARGIN: f32 = 40.0;
/// Minimum gap between two body-contact hits on the target.
pub const CONTACT_HIT_COOLDOWN_MS: f32 = 500.0;
pub const CONTACT_KNOCKBACK: f32 = 250.0;
/// Share of incoming knockback the boss actually receives.
pub const SELF_KNOCKBACK_FACTOR: f32 = 0.15;
/// Exponential decay rate of the boss's knockback drift, per second.
pub const KNOCKBACK_DECAY: f32 = 8.0;
/// Arena extent assumed when no grid is supplied.
pub const DEFAULT_ARENA_SIZE: (f32, f32) = (1280.0, 720.0);

/// Everything needed to create a boss.
#[derive(Debug, Clone)]
pub struct BossSpawn {
    pub x: f32,
    pub y: f32,
    pub archetype: Archetype,
    /// Bosses defeated so far this session.
    pub encounter_index: u32,
    pub stage: u32,
    /// Cosmetic palette override; the archetype default is used when `None`.
    pub theme: Option<String>,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    /// Arena extent used until a grid is seen.
    pub arena_size: (f32, f32),
}

impl BossSpawn {
    pub fn new(x: f32, y: f32, archetype: Archetype, encounter_index: u32, stage: u32) -> Self {
        Self {
            x,
            y,
            archetype,
            encounter_index,
            stage,
            theme: None,
            seed: None,
            arena_size: DEFAULT_ARENA_SIZE,
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_arena_size(mut self, width: f32, height: f32) -> Self {
        self.arena_size = (width, height);
        self
    }
}

/// A live boss encounter.
///
/// Mutated only through [`BossController::update`] and
/// [`BossController::take_damage`]. The caller drains [`events`](Self::drain_events)
/// and [`spawn requests`](Self::drain_spawns) every tick and removes the boss
/// once [`is_dead`](Self::is_dead) reports true.
#[derive(Debug)]
pub struct BossController {
    pub(super) archetype: Archetype,
    pub(super) encounter_index: u32,
    pub(super) stage: u32,
    pub(super) theme: String,
    pub(super) x: f32,
    pub(super) y: f32,
    /// Radians.
    pub(super) facing: f32,
    pub(super) stats: BossStats,
    pub(super) health: f32,
    pub(super) phase: Phase,
    pub(super) phase_transition_timer_ms: f32,
    pub(super) attack: AttackState,
    /// Gates idle -> windup.
    pub(super) attack_cooldown_ms: f32,
    pub(super) contact_cooldown_ms: f32,
    pub(super) beam_cooldown_ms: f32,
    pub(super) knockback: (f32, f32),
    pub(super) arena_size: (f32, f32),
    pub(super) events: Vec<BossEvent>,
    pub(super) pending_spawns: Vec<SpawnRequest>,
    pub(super) damage_sink: DamageSink,
    pub(super) rng: StdRng,
}

impl BossController {
    pub fn new(spawn: BossSpawn, damage_sink: DamageSink) -> Self {
        let def = spawn.archetype.def();
        let stats = scaling::derive_stats(def, spawn.encounter_index, spawn.stage);
        let rng = match spawn.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        debug!(
            archetype = %spawn.archetype,
            encounter = spawn.encounter_index,
            stage = spawn.stage,
            max_health = stats.max_health,
            speed = stats.speed,
            contact_damage = stats.contact_damage,
            "boss spawned"
        );

        Self {
            archetype: spawn.archetype,
            encounter_index: spawn.encounter_index,
            stage: spawn.stage,
            theme: spawn
                .theme
                .unwrap_or_else(|| def.default_theme.to_string()),
            x: spawn.x,
            y: spawn.y,
            facing: 0.0,
            stats,
            health: stats.max_health,
            phase: Phase::One,
            phase_transition_timer_ms: 0.0,
            attack: AttackState::Idle,
            attack_cooldown_ms: def.base_cooldown_ms * SPAWN_COOLDOWN_FRACTION,
            contact_cooldown_ms: 0.0,
            beam_cooldown_ms: 0.0,
            knockback: (0.0, 0.0),
            arena_size: spawn.arena_size,
            events: Vec::new(),
            pending_spawns: Vec::new(),
            damage_sink,
            rng,
        }
    }

    /// Advance the encounter by `dt` seconds.
    ///
    /// Order within a tick: cooldowns and drift, facing, contact damage, phase
    /// check, then the idle scheduler or the current attack stage, and finally
    /// wall resolution.
    pub fn update(
        &mut self,
        dt: f32,
        target: &mut dyn Target,
        grid: Option<&dyn Grid>,
        others: &[EntityPos],
        projectiles: &mut Vec<Projectile>,
    ) {
        if self.is_dead() {
            return;
        }
        let dt_ms = dt * 1000.0;
        if let Some(grid) = grid {
            self.arena_size = grid.world_size();
        }

        self.tick_cooldowns(dt_ms);
        self.drift(dt);
        self.update_facing(&*target);
        self.contact_damage(target);
        self.check_phase_transition();

        match self.attack.stage() {
            AttackStage::Idle => self.tick_idle(dt, target, grid),
            AttackStage::Windup => self.tick_windup(dt_ms, target, grid, others, projectiles),
            AttackStage::Active => self.tick_active(dt, target, projectiles),
            AttackStage::Recovery => self.tick_recovery(dt_ms),
        }

        self.settle(grid);
    }

    /// Apply incoming damage. A no-op once the boss is dead.
    pub fn take_damage(&mut self, amount: f32, knockback_x: f32, knockback_y: f32, is_crit: bool) {
        if self.is_dead() {
            return;
        }
        let amount = amount.max(0.0);
        self.health = (self.health - amount).clamp(0.0, self.stats.max_health);
        self.damage_sink.record(DamageEvent {
            x: self.x,
            y: self.y,
            amount,
            is_crit,
        });
        self.knockback.0 += knockback_x * SELF_KNOCKBACK_FACTOR;
        self.knockback.1 += knockback_y * SELF_KNOCKBACK_FACTOR;

        if self.is_dead() {
            self.events.push(BossEvent::Defeated {
                x: self.x,
                y: self.y,
            });
            info!(archetype = %self.archetype, encounter = self.encounter_index, "boss defeated");
        }
    }

    /// Take this tick's events.
    pub fn drain_events(&mut self) -> Vec<BossEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take this tick's minion spawn requests.
    pub fn drain_spawns(&mut self) -> Vec<SpawnRequest> {
        std::mem::take(&mut self.pending_spawns)
    }

    /// Events queued since the last drain.
    pub fn events(&self) -> &[BossEvent] {
        &self.events
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn encounter_index(&self) -> u32 {
        self.encounter_index
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn stats(&self) -> &BossStats {
        &self.stats
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.stats.max_health
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Remaining cosmetic hold after the phase change, in milliseconds.
    pub fn phase_transition_timer(&self) -> f32 {
        self.phase_transition_timer_ms
    }

    pub fn current_attack(&self) -> Option<AttackKind> {
        self.attack.kind()
    }

    pub fn attack_stage(&self) -> AttackStage {
        self.attack.stage()
    }

    /// Payload of the attack in progress (locked telegraph data for renderers).
    pub fn attack_payload(&self) -> Option<&AttackPayload> {
        self.attack.payload()
    }

    /// Countdown for the current stage, or zero when idle.
    pub fn attack_timer(&self) -> f32 {
        match &self.attack {
            AttackState::Idle => 0.0,
            AttackState::Engaged(a) => a.timer_ms,
        }
    }

    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown_ms
    }

    pub(super) fn def(&self) -> &'static ArchetypeDef {
        self.archetype.def()
    }

    fn tick_cooldowns(&mut self, dt_ms: f32) {
        self.contact_cooldown_ms = (self.contact_cooldown_ms - dt_ms).max(0.0);
        self.beam_cooldown_ms = (self.beam_cooldown_ms - dt_ms).max(0.0);
        self.phase_transition_timer_ms = (self.phase_transition_timer_ms - dt_ms).max(0.0);
    }

    fn drift(&mut self, dt: f32) {
        self.x += self.knockback.0 * dt;
        self.y += self.knockback.1 * dt;
        let keep = (1.0 - KNOCKBACK_DECAY * dt).max(0.0);
        self.knockback.0 *= keep;
        self.knockback.1 *= keep;
    }

    fn update_facing(&mut self, target: &dyn Target) {
        if let AttackState::Engaged(attack) = &self.attack {
            if attack.stage == AttackStage::Active {
                match attack.payload {
                    AttackPayload::Dash { dir_x, dir_y } => {
                        self.facing = dir_y.atan2(dir_x);
                        return;
                    }
                    AttackPayload::Sweep { angle, .. } => {
                        self.facing = angle;
                        return;
                    }
                    _ => {}
                }
            }
        }
        let (tx, ty) = target.position();
        if pathfinding::direction_toward(self.x, self.y, tx, ty).is_some() {
            self.facing = pathfinding::angle_toward(self.x, self.y, tx, ty);
        }
    }

    fn contact_damage(&mut self, target: &mut dyn Target) {
        if self.contact_cooldown_ms > 0.0 {
            return;
        }
        let (tx, ty) = target.position();
        if !combat::circles_overlap(
            self.x,
            self.y,
            self.stats.collision_radius,
            tx,
            ty,
            target.radius(),
        ) {
            return;
        }

        let damage = self.current_contact_damage();
        target.take_damage(damage);
        let (kx, ky) = combat::knockback_vector(self.x, self.y, tx, ty, CONTACT_KNOCKBACK);
        target.apply_knockback(kx, ky);
        self.contact_cooldown_ms = CONTACT_HIT_COOLDOWN_MS;
        self.events.push(BossEvent::ContactHit { damage });
    }

    fn tick_idle(&mut self, dt: f32, target: &mut dyn Target, grid: Option<&dyn Grid>) {
        self.attack_cooldown_ms -= dt * 1000.0;

        let (tx, ty) = target.position();
        if pathfinding::distance(self.x, self.y, tx, ty)
            > self.stats.collision_radius + IDLE_APPROACH_MARGIN
        {
            let (sx, sy) = pathfinding::step_toward(self.x, self.y, tx, ty, self.stats.speed * dt);
            self.x += sx;
            self.y += sy;
        }

        if self.attack_cooldown_ms > 0.0 {
            return;
        }

        let pool = self.archetype.attacks();
        match selection::pick_weighted(pool, |e| e.weight, &mut self.rng).copied() {
            Some(entry) => self.begin_windup(entry, &*target, grid),
            None => {
                warn!(archetype = %self.archetype, "attack pool has no selectable entries");
                self.attack_cooldown_ms = self.def().base_cooldown_ms;
            }
        }
    }

    fn tick_recovery(&mut self, dt_ms: f32) {
        let finished = match &mut self.attack {
            AttackState::Engaged(attack) => {
                attack.timer_ms -= dt_ms;
                attack.timer_ms <= 0.0
            }
            AttackState::Idle => false,
        };
        if finished {
            let kind = self.attack.kind();
            self.attack = AttackState::Idle;
            self.attack_cooldown_ms = self.def().base_cooldown_ms * self.phase.tempo();
            debug!(
                kind = ?kind.map(|k| k.name()),
                cooldown_ms = self.attack_cooldown_ms,
                "attack recovered"
            );
        }
    }

    /// Keep the body out of walls and inside the arena.
    pub(super) fn settle(&mut self, grid: Option<&dyn Grid>) {
        let radius = self.stats.collision_radius;
        match grid {
            Some(grid) => grid::resolve_walls(grid, &mut self.x, &mut self.y, radius),
            None => {
                let (w, h) = self.arena_size;
                grid::clamp_to_bounds(&mut self.x, &mut self.y, radius, w, h);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::attack::ActiveAttack;
    use crate::boss::events::damage_channel;
    use crate::combat::tests::Dummy;
    use crate::grid::TileGrid;

    const DT: f32 = 1.0 / 60.0;

    fn boss(archetype: Archetype) -> (BossController, crate::boss::DamageFeed) {
        let (sink, feed) = damage_channel();
        let spawn = BossSpawn::new(400.0, 300.0, archetype, 0, 1).with_seed(42);
        (BossController::new(spawn, sink), feed)
    }

    fn tick(boss: &mut BossController, target: &mut Dummy, projectiles: &mut Vec<Projectile>) {
        boss.update(DT, target, None, &[], projectiles);
    }

    fn assert_attack_invariant(boss: &BossController) {
        assert_eq!(
            boss.current_attack().is_none(),
            boss.attack_stage() == AttackStage::Idle
        );
    }

    #[test]
    fn spawns_with_full_health_and_initial_cooldown() {
        let (b, _) = boss(Archetype::Brute);
        assert_eq!(b.health(), 530.0);
        assert_eq!(b.max_health(), 530.0);
        assert_eq!(b.phase(), Phase::One);
        assert_eq!(b.attack_stage(), AttackStage::Idle);
        assert!((b.attack_cooldown() - 2200.0 * 0.4).abs() < 0.01);
        assert_eq!(b.theme(), "rust");
    }

    #[test]
    fn theme_override() {
        let (sink, _feed) = damage_channel();
        let spawn = BossSpawn::new(0.0, 0.0, Archetype::Warlock, 0, 0).with_theme("crimson");
        let b = BossController::new(spawn, sink);
        assert_eq!(b.theme(), "crimson");
    }

    #[test]
    fn take_damage_clamps_at_zero_and_is_idempotent_after_death() {
        let (mut b, feed) = boss(Archetype::Brute);
        b.take_damage(10_000.0, 0.0, 0.0, true);
        assert_eq!(b.health(), 0.0);
        assert!(b.is_dead());
        b.take_damage(50.0, 0.0, 0.0, false);
        assert_eq!(b.health(), 0.0);

        let numbers = feed.drain();
        assert_eq!(numbers.len(), 1);
        assert!(numbers[0].is_crit);

        let defeated = b
            .drain_events()
            .iter()
            .filter(|e| matches!(e, BossEvent::Defeated { .. }))
            .count();
        assert_eq!(defeated, 1);
    }

    #[test]
    fn negative_damage_does_not_heal() {
        let (mut b, _feed) = boss(Archetype::Brute);
        b.take_damage(-100.0, 0.0, 0.0, false);
        assert_eq!(b.health(), b.max_health());
    }

    #[test]
    fn dead_boss_does_not_update() {
        let (mut b, _feed) = boss(Archetype::Brute);
        b.take_damage(10_000.0, 0.0, 0.0, false);
        b.drain_events();
        let mut target = Dummy::at(410.0, 300.0);
        let mut projectiles = Vec::new();
        let before = b.position();
        tick(&mut b, &mut target, &mut projectiles);
        assert_eq!(b.position(), before);
        assert_eq!(target.hits, 0);
        assert!(b.events().is_empty());
    }

    #[test]
    fn self_knockback_is_heavily_resisted() {
        let (mut b, _feed) = boss(Archetype::Brute);
        b.take_damage(1.0, 1000.0, 0.0, false);
        assert!((b.knockback.0 - 150.0).abs() < 0.01);
    }

    #[test]
    fn idle_boss_walks_toward_far_target() {
        let (mut b, _feed) = boss(Archetype::Brute);
        b.attack_cooldown_ms = 10_000.0;
        let mut target = Dummy::at(800.0, 300.0);
        let mut projectiles = Vec::new();
        tick(&mut b, &mut target, &mut projectiles);
        let expected = 400.0 + b.stats().speed * DT;
        assert!((b.position().0 - expected).abs() < 0.01);
        assert!(b.facing().abs() < 0.001);
    }

    #[test]
    fn idle_boss_holds_when_close() {
        let (mut b, _feed) = boss(Archetype::Brute);
        b.attack_cooldown_ms = 10_000.0;
        let mut target = Dummy::at(450.0, 300.0); // 50 < 30 + 40
        let mut projectiles = Vec::new();
        tick(&mut b, &mut target, &mut projectiles);
        assert_eq!(b.position(), (400.0, 300.0));
    }

    #[test]
    fn contact_damage_respects_cooldown() {
        let (mut b, _feed) = boss(Archetype::Brute);
        b.attack_cooldown_ms = 10_000.0;
        let mut target = Dummy::at(420.0, 300.0);
        let mut projectiles = Vec::new();
        tick(&mut b, &mut target, &mut projectiles);
        assert_eq!(target.hits, 1);
        assert!(target.knockback.0 > 0.0);
        for _ in 0..10 {
            tick(&mut b, &mut target, &mut projectiles);
        }
        assert_eq!(target.hits, 1, "cooldown blocks repeat hits");
        for _ in 0..30 {
            tick(&mut b, &mut target, &mut projectiles);
        }
        assert_eq!(target.hits, 2);
    }

    #[test]
    fn cooldown_expiry_starts_windup() {
        let (mut b, _feed) = boss(Archetype::Warlock);
        b.attack_cooldown_ms = 1.0;
        let mut target = Dummy::at(600.0, 300.0);
        let mut projectiles = Vec::new();
        tick(&mut b, &mut target, &mut projectiles);
        assert_eq!(b.attack_stage(), AttackStage::Windup);
        let kind = b.current_attack().unwrap();
        let entry = Archetype::Warlock
            .attacks()
            .iter()
            .find(|e| e.kind == kind)
            .unwrap();
        assert!((b.attack_timer() - entry.windup_ms).abs() < 0.01);
        assert!(matches!(
            b.events()[0],
            BossEvent::AttackWindup { kind: k, .. } if k == kind
        ));
    }

    #[test]
    fn phase_two_windup_is_faster() {
        let (mut b, _feed) = boss(Archetype::Warlock);
        b.phase = Phase::Two;
        b.health = 1.0;
        b.attack_cooldown_ms = 1.0;
        let mut target = Dummy::at(600.0, 300.0);
        let mut projectiles = Vec::new();
        tick(&mut b, &mut target, &mut projectiles);
        let kind = b.current_attack().unwrap();
        let entry = Archetype::Warlock
            .attacks()
            .iter()
            .find(|e| e.kind == kind)
            .unwrap();
        assert!((b.attack_timer() - entry.windup_ms * 0.7).abs() < 0.01);
    }

    #[test]
    fn full_cycle_returns_to_idle_with_cooldown() {
        let (mut b, _feed) = boss(Archetype::Warlock);
        let mut target = Dummy::at(650.0, 300.0);
        let mut projectiles = Vec::new();
        let mut seen_active_or_recovery = false;
        let mut returned = false;
        for _ in 0..600 {
            tick(&mut b, &mut target, &mut projectiles);
            assert_attack_invariant(&b);
            match b.attack_stage() {
                AttackStage::Active | AttackStage::Recovery => seen_active_or_recovery = true,
                AttackStage::Idle if seen_active_or_recovery => {
                    returned = true;
                    break;
                }
                _ => {}
            }
        }
        assert!(returned);
        assert!(b.attack_cooldown() > 2000.0 - 20.0);
    }

    #[test]
    fn phase_transition_cancels_attack_same_tick() {
        let (mut b, _feed) = boss(Archetype::Brute);
        b.stats.max_health = 100.0;
        b.health = 100.0;
        b.attack = AttackState::Engaged(ActiveAttack {
            kind: AttackKind::Charge,
            stage: AttackStage::Active,
            timer_ms: 400.0,
            payload: AttackPayload::Dash {
                dir_x: 1.0,
                dir_y: 0.0,
            },
        });

        b.take_damage(60.0, 0.0, 0.0, false);
        assert_eq!(b.health(), 40.0);

        let mut target = Dummy::at(700.0, 300.0);
        let mut projectiles = Vec::new();
        tick(&mut b, &mut target, &mut projectiles);

        assert_eq!(b.phase(), Phase::Two);
        assert_eq!(b.current_attack(), None);
        assert_eq!(b.attack_stage(), AttackStage::Idle);
        let cooldown = b.attack_cooldown();
        assert!(cooldown <= 2200.0 * 0.3 && cooldown > 2200.0 * 0.3 - 20.0);
        assert!(b.phase_transition_timer() > 0.0);
        assert!(b
            .events()
            .iter()
            .any(|e| matches!(e, BossEvent::PhaseTransition { phase: 2 })));
    }

    #[test]
    fn phase_transition_fires_once() {
        let (mut b, _feed) = boss(Archetype::Sentinel);
        b.take_damage(b.max_health() * 0.6, 0.0, 0.0, false);
        let mut target = Dummy::at(700.0, 300.0);
        let mut projectiles = Vec::new();
        let mut transitions = 0;
        for _ in 0..300 {
            tick(&mut b, &mut target, &mut projectiles);
            transitions += b
                .drain_events()
                .iter()
                .filter(|e| matches!(e, BossEvent::PhaseTransition { .. }))
                .count();
            assert_eq!(b.phase(), Phase::Two);
        }
        assert_eq!(transitions, 1);
    }

    #[test]
    fn no_transition_above_half_health() {
        let (mut b, _feed) = boss(Archetype::Brute);
        b.take_damage(b.max_health() * 0.49, 0.0, 0.0, false);
        let mut target = Dummy::at(700.0, 300.0);
        let mut projectiles = Vec::new();
        tick(&mut b, &mut target, &mut projectiles);
        assert_eq!(b.phase(), Phase::One);
    }

    #[test]
    fn wall_resolution_keeps_boss_inside_grid() {
        let grid = TileGrid::open_room(20, 15, 32.0);
        let (sink, _feed) = damage_channel();
        let spawn = BossSpawn::new(64.0, 50.0, Archetype::Brute, 0, 0).with_seed(1);
        let mut b = BossController::new(spawn, sink);
        b.attack_cooldown_ms = 10_000.0;
        let mut target = Dummy::at(300.0, 240.0);
        let mut projectiles = Vec::new();
        b.update(DT, &mut target, Some(&grid), &[], &mut projectiles);
        let (x, y) = b.position();
        // Top wall row ends at y = 32 and the Brute body is 30 wide.
        assert!(x >= 62.0 && y >= 62.0 - 0.01, "({x}, {y})");
    }

    #[test]
    fn long_run_keeps_invariants_for_every_archetype() {
        for archetype in Archetype::ALL {
            let (mut b, _feed) = boss(archetype);
            let grid = TileGrid::open_room(40, 24, 32.0);
            let mut target = Dummy::at(500.0, 380.0);
            let mut projectiles = Vec::new();
            for i in 0..3000 {
                if i == 1500 {
                    b.take_damage(b.max_health() * 0.55, 0.0, 0.0, false);
                }
                b.update(DT, &mut target, Some(&grid), &[], &mut projectiles);
                assert_attack_invariant(&b);
                assert!(b.health() >= 0.0 && b.health() <= b.max_health());
                b.drain_events();
                b.drain_spawns();
            }
            assert_eq!(b.phase(), Phase::Two, "{archetype}");
        }
    }
}
