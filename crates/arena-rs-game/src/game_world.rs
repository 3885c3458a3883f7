//! ECS arena world: bevy_ecs World, entity management, tick systems, and event bus.

use std::sync::atomic::{AtomicU64, Ordering};

use bevy_ecs::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::boss::controller::KNOCKBACK_DECAY;
use crate::boss::scaling::BossStats;
use crate::boss::{
    damage_channel, Archetype, AttackKind, AttackStage, BossController, BossEvent, BossSpawn,
    DamageEvent, DamageFeed, DamageSink, Phase, SpawnKind, SpawnRequest,
};
use crate::combat::{EntityPos, Target};
use crate::components::*;
use crate::grid::{self, Grid, TileGrid};
use crate::projectile::{self, Projectile, ProjectileKind, StepOutcome};

pub const PLAYER_MAX_HEALTH: f32 = 100.0;
pub const PLAYER_RADIUS: f32 = 12.0;
pub const MINION_RADIUS: f32 = 12.0;
/// Minion health as a share of the summoning boss's max health.
const MINION_HEALTH_FRACTION: f32 = 0.05;
const DECOY_HEALTH: f32 = 1.0;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Outgoing events queued by ECS operations for the host to consume.
#[derive(Resource, Default)]
pub struct OutgoingEvents {
    pub events: Vec<GameEvent>,
}

/// Number of ticks run so far.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Thread-safe entity ID allocator (shared by every entity kind).
#[derive(Resource)]
pub struct EntityIdAllocator {
    next: AtomicU64,
}

impl EntityIdAllocator {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// Allocate the next entity ID.
    pub fn allocate(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Next ID that will be allocated.
    pub fn current(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// The arena's tile grid, if it has one.
#[derive(Resource, Default)]
pub struct ArenaGrid(pub Option<TileGrid>);

/// Hostile projectiles in flight.
#[derive(Resource, Default)]
pub struct ProjectileList(pub Vec<Projectile>);

// ---------------------------------------------------------------------------
// Game events (ECS -> host)
// ---------------------------------------------------------------------------

/// Events produced by the arena world.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    BossSpawned {
        id: u64,
        archetype: Archetype,
        theme: String,
        x: f32,
        y: f32,
        max_health: f32,
    },
    /// Something a boss did this tick.
    Boss { id: u64, event: BossEvent },
    MinionSpawned {
        id: u64,
        owner: u64,
        kind: SpawnKind,
        x: f32,
        y: f32,
    },
    PlayerHurt { damage: f32, health: f32 },
    PlayerDefeated,
    RocketExploded { x: f32, y: f32, radius: f32 },
    /// An entity's health reached zero.
    EntityDied { id: u64 },
    /// An entity was despawned.
    EntityRemoved { id: u64 },
}

/// Read-only view of a boss.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossSnapshot {
    pub id: u64,
    pub archetype: Archetype,
    pub theme: String,
    pub position: (f32, f32),
    pub facing: f32,
    pub health: f32,
    pub max_health: f32,
    pub phase: Phase,
    pub attack: Option<AttackKind>,
    pub stage: AttackStage,
    pub dead: bool,
}

/// Read-only view of the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub id: u64,
    pub position: (f32, f32),
    pub health: f32,
    pub max_health: f32,
    pub dead: bool,
}

// ---------------------------------------------------------------------------
// ArenaWorld
// ---------------------------------------------------------------------------

/// The ECS arena.
pub struct ArenaWorld {
    pub world: World,
    damage_sink: DamageSink,
    damage_feed: DamageFeed,
}

impl ArenaWorld {
    /// Create an arena, optionally bounded by a tile grid.
    pub fn new(grid: Option<TileGrid>) -> Self {
        let mut world = World::new();
        world.insert_resource(OutgoingEvents::default());
        world.insert_resource(TickCounter::default());
        world.insert_resource(EntityIdAllocator::new(1));
        world.insert_resource(ArenaGrid(grid));
        world.insert_resource(ProjectileList::default());

        let (damage_sink, damage_feed) = damage_channel();
        Self {
            world,
            damage_sink,
            damage_feed,
        }
    }

    /// Run one tick of `dt` seconds: player movement, bosses, projectiles, deaths.
    ///
    /// Dead bosses are only marked; call [`remove_dead_bosses`](Self::remove_dead_bosses)
    /// to despawn them.
    pub fn tick(&mut self, dt: f32) {
        self.world.resource_mut::<TickCounter>().0 += 1;
        system_player_movement(&mut self.world, dt);
        system_boss_tick(&mut self.world, dt);
        system_projectiles(&mut self.world, dt);
        system_player_death(&mut self.world);
    }

    /// Drain all pending outgoing events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.world.resource_mut::<OutgoingEvents>().events)
    }

    /// Drain damage numbers recorded since the last call.
    pub fn drain_damage_numbers(&self) -> Vec<DamageEvent> {
        self.damage_feed.drain()
    }

    pub fn current_tick(&self) -> u64 {
        self.world.resource::<TickCounter>().0
    }

    pub fn grid(&self) -> Option<&TileGrid> {
        self.world.resource::<ArenaGrid>().0.as_ref()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.world.resource::<ProjectileList>().0
    }

    /// Spawn the player. Returns its ID.
    pub fn spawn_player(&mut self, x: f32, y: f32) -> u64 {
        let id = self.world.resource::<EntityIdAllocator>().allocate();
        self.world.spawn((
            EntityId(id),
            Position { x, y },
            Velocity::default(),
            Knockback::default(),
            Health {
                current: PLAYER_MAX_HEALTH,
                max: PLAYER_MAX_HEALTH,
            },
            Radius(PLAYER_RADIUS),
            Player,
        ));
        id
    }

    /// Spawn a boss. The arena grid, if any, overrides the spawn's arena size.
    pub fn spawn_boss(&mut self, mut spawn: BossSpawn) -> u64 {
        if let Some(grid) = self.grid() {
            spawn.arena_size = grid.world_size();
        }
        let controller = BossController::new(spawn, self.damage_sink.clone());
        let id = self.world.resource::<EntityIdAllocator>().allocate();
        let (x, y) = controller.position();
        let stats = *controller.stats();

        self.world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::BossSpawned {
                id,
                archetype: controller.archetype(),
                theme: controller.theme().to_string(),
                x,
                y,
                max_health: stats.max_health,
            });
        info!(
            id,
            archetype = %controller.archetype(),
            encounter = controller.encounter_index(),
            stage = controller.stage(),
            "boss entered the arena"
        );

        self.world.spawn((
            EntityId(id),
            Position { x, y },
            Health {
                current: stats.max_health,
                max: stats.max_health,
            },
            Radius(stats.collision_radius),
            BossBrain(controller),
        ));
        id
    }

    /// Set the player's intended movement in units/second.
    pub fn set_player_velocity(&mut self, vx: f32, vy: f32) {
        let mut query = self.world.query_filtered::<&mut Velocity, With<Player>>();
        for mut vel in query.iter_mut(&mut self.world) {
            vel.x = vx;
            vel.y = vy;
        }
    }

    /// Teleport the player.
    pub fn set_player_position(&mut self, x: f32, y: f32) {
        let mut query = self.world.query_filtered::<&mut Position, With<Player>>();
        for mut pos in query.iter_mut(&mut self.world) {
            pos.x = x;
            pos.y = y;
        }
    }

    /// Damage a boss or minion. Returns remaining health, or `None` if not found or already dead.
    pub fn damage_entity(
        &mut self,
        id: u64,
        amount: f32,
        knockback_x: f32,
        knockback_y: f32,
        is_crit: bool,
    ) -> Option<f32> {
        let entity = self.find_entity(id)?;
        if self.world.get::<Dead>(entity).is_some() || self.world.get::<Player>(entity).is_some()
        {
            return None;
        }

        let boss_health = self.world.get_mut::<BossBrain>(entity).map(|mut brain| {
            brain.0.take_damage(amount, knockback_x, knockback_y, is_crit);
            brain.0.health()
        });
        if let Some(health) = boss_health {
            if let Some(mut h) = self.world.get_mut::<Health>(entity) {
                h.current = health;
            }
            return Some(health);
        }

        let (x, y) = self
            .world
            .get::<Position>(entity)
            .map(|p| (p.x, p.y))?;
        let health = {
            let mut h = self.world.get_mut::<Health>(entity)?;
            h.current = (h.current - amount.max(0.0)).max(0.0);
            h.current
        };
        self.damage_sink.record(DamageEvent {
            x,
            y,
            amount,
            is_crit,
        });

        if health <= 0.0 {
            self.world.despawn(entity);
            let mut outgoing = self.world.resource_mut::<OutgoingEvents>();
            outgoing.events.push(GameEvent::EntityDied { id });
            outgoing.events.push(GameEvent::EntityRemoved { id });
        }
        Some(health)
    }

    /// Despawn every boss marked dead. Returns their IDs.
    pub fn remove_dead_bosses(&mut self) -> Vec<u64> {
        let dead: Vec<(Entity, u64)> = self
            .world
            .query_filtered::<(Entity, &EntityId), (With<BossBrain>, With<Dead>)>()
            .iter(&self.world)
            .map(|(entity, id)| (entity, id.0))
            .collect();

        let mut removed = Vec::with_capacity(dead.len());
        for (entity, id) in dead {
            self.world.despawn(entity);
            self.world
                .resource_mut::<OutgoingEvents>()
                .events
                .push(GameEvent::EntityRemoved { id });
            removed.push(id);
        }
        removed
    }

    pub fn player(&mut self) -> Option<PlayerSnapshot> {
        let mut query = self
            .world
            .query_filtered::<(&EntityId, &Position, &Health, Has<Dead>), With<Player>>();
        query
            .iter(&self.world)
            .next()
            .map(|(id, pos, health, dead)| PlayerSnapshot {
                id: id.0,
                position: (pos.x, pos.y),
                health: health.current,
                max_health: health.max,
                dead,
            })
    }

    pub fn bosses(&mut self) -> Vec<BossSnapshot> {
        let mut query = self
            .world
            .query::<(&EntityId, &BossBrain, Has<Dead>)>();
        query
            .iter(&self.world)
            .map(|(id, brain, dead)| snapshot(id.0, &brain.0, dead))
            .collect()
    }

    pub fn boss(&mut self, id: u64) -> Option<BossSnapshot> {
        self.bosses().into_iter().find(|b| b.id == id)
    }

    /// Number of live minions and decoys.
    pub fn minion_count(&mut self) -> usize {
        self.world
            .query_filtered::<(), (With<Minion>, Without<Dead>)>()
            .iter(&self.world)
            .count()
    }

    fn find_entity(&mut self, id: u64) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &EntityId)>();
        for (entity, eid) in query.iter(&self.world) {
            if eid.0 == id {
                return Some(entity);
            }
        }
        None
    }
}

fn snapshot(id: u64, boss: &BossController, dead: bool) -> BossSnapshot {
    BossSnapshot {
        id,
        archetype: boss.archetype(),
        theme: boss.theme().to_string(),
        position: boss.position(),
        facing: boss.facing(),
        health: boss.health(),
        max_health: boss.max_health(),
        phase: boss.phase(),
        attack: boss.current_attack(),
        stage: boss.attack_stage(),
        dead,
    }
}

// ---------------------------------------------------------------------------
// Player proxy
// ---------------------------------------------------------------------------

/// Stand-in for the player handed to boss controllers.
///
/// Collects damage and knockback during the boss pass; the totals are written
/// back to the player entity afterwards.
#[derive(Debug, Clone, Copy)]
struct PlayerProxy {
    x: f32,
    y: f32,
    radius: f32,
    vx: f32,
    vy: f32,
    damage: f32,
    knockback: (f32, f32),
}

impl Target for PlayerProxy {
    fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }

    fn take_damage(&mut self, amount: f32) {
        self.damage += amount;
    }

    fn apply_knockback(&mut self, kx: f32, ky: f32) {
        self.knockback.0 += kx;
        self.knockback.1 += ky;
    }
}

fn player_proxy(world: &mut World) -> Option<(Entity, PlayerProxy)> {
    let mut query = world
        .query_filtered::<(Entity, &Position, &Velocity, &Radius), (With<Player>, Without<Dead>)>();
    query.iter(world).next().map(|(entity, pos, vel, radius)| {
        (
            entity,
            PlayerProxy {
                x: pos.x,
                y: pos.y,
                radius: radius.0,
                vx: vel.x,
                vy: vel.y,
                damage: 0.0,
                knockback: (0.0, 0.0),
            },
        )
    })
}

fn hurt_player(
    world: &mut World,
    player: Entity,
    damage: f32,
    knockback: (f32, f32),
    events: &mut Vec<GameEvent>,
) {
    if let Some(mut kb) = world.get_mut::<Knockback>(player) {
        kb.x += knockback.0;
        kb.y += knockback.1;
    }
    if damage <= 0.0 {
        return;
    }
    if let Some(mut health) = world.get_mut::<Health>(player) {
        health.current = (health.current - damage).max(0.0);
        events.push(GameEvent::PlayerHurt {
            damage,
            health: health.current,
        });
    }
}

// ---------------------------------------------------------------------------
// Systems (manual, called by ArenaWorld::tick)
// ---------------------------------------------------------------------------

/// Integrate player movement and knockback, then keep the player out of walls.
fn system_player_movement(world: &mut World, dt: f32) {
    world.resource_scope(|world, arena: Mut<ArenaGrid>| {
        let mut query = world.query_filtered::<
            (&mut Position, &Velocity, &mut Knockback, &Radius),
            (With<Player>, Without<Dead>),
        >();
        for (mut pos, vel, mut kb, radius) in query.iter_mut(world) {
            pos.x += (vel.x + kb.x) * dt;
            pos.y += (vel.y + kb.y) * dt;

            let keep = (1.0 - KNOCKBACK_DECAY * dt).max(0.0);
            kb.x *= keep;
            kb.y *= keep;

            if let Some(grid) = arena.0.as_ref() {
                let Position { x, y } = &mut *pos;
                grid::resolve_walls(grid, x, y, radius.0);
            }
        }
    });
}

/// Update every live boss against the player, then apply the fallout.
fn system_boss_tick(world: &mut World, dt: f32) {
    let mut target = player_proxy(world);
    let minions: Vec<EntityPos> = world
        .query_filtered::<(&Position, &Radius), (With<Minion>, Without<Dead>)>()
        .iter(world)
        .map(|(pos, radius)| EntityPos {
            x: pos.x,
            y: pos.y,
            radius: radius.0,
        })
        .collect();
    let mut projectiles = std::mem::take(&mut world.resource_mut::<ProjectileList>().0);

    let mut events = Vec::new();
    let mut spawns = Vec::new();
    let mut died = Vec::new();

    world.resource_scope(|world, arena: Mut<ArenaGrid>| {
        let grid = arena.0.as_ref().map(|g| g as &dyn Grid);
        let mut query = world.query_filtered::<
            (Entity, &EntityId, &mut BossBrain, &mut Position, &mut Health),
            Without<Dead>,
        >();
        for (entity, id, mut brain, mut pos, mut health) in query.iter_mut(world) {
            let boss = &mut brain.0;
            if let Some((_, proxy)) = target.as_mut() {
                boss.update(dt, proxy, grid, &minions, &mut projectiles);
            }

            let (x, y) = boss.position();
            pos.x = x;
            pos.y = y;
            health.current = boss.health();

            events.extend(
                boss.drain_events()
                    .into_iter()
                    .map(|event| GameEvent::Boss { id: id.0, event }),
            );
            let stats = *boss.stats();
            spawns.extend(
                boss.drain_spawns()
                    .into_iter()
                    .map(|request| (id.0, stats, request)),
            );
            if boss.is_dead() {
                died.push((entity, id.0));
            }
        }
    });

    world.resource_mut::<ProjectileList>().0 = projectiles;

    if let Some((player, proxy)) = target {
        hurt_player(world, player, proxy.damage, proxy.knockback, &mut events);
    }
    for (entity, id) in died {
        world.entity_mut(entity).insert(Dead);
        events.push(GameEvent::EntityDied { id });
    }
    spawn_minions(world, spawns, &mut events);

    world.resource_mut::<OutgoingEvents>().events.extend(events);
}

/// Turn boss spawn requests into inert minion entities.
fn spawn_minions(
    world: &mut World,
    spawns: Vec<(u64, BossStats, SpawnRequest)>,
    events: &mut Vec<GameEvent>,
) {
    for (owner, stats, request) in spawns {
        let id = world.resource::<EntityIdAllocator>().allocate();
        let health = match request.kind {
            SpawnKind::Minion => (stats.max_health * MINION_HEALTH_FRACTION).floor().max(1.0),
            SpawnKind::Decoy => DECOY_HEALTH,
        };

        let (mut x, mut y) = (request.x, request.y);
        if let Some(grid) = world.resource::<ArenaGrid>().0.as_ref() {
            grid::resolve_walls(grid, &mut x, &mut y, MINION_RADIUS);
        }

        world.spawn((
            EntityId(id),
            Position { x, y },
            Health {
                current: health,
                max: health,
            },
            Radius(MINION_RADIUS),
            Minion {
                kind: request.kind,
                owner,
            },
        ));
        debug!(id, owner, kind = ?request.kind, x, y, "minion spawned");
        events.push(GameEvent::MinionSpawned {
            id,
            owner,
            kind: request.kind,
            x,
            y,
        });
    }
}

/// Step projectiles, resolving player hits, wall impacts, and rocket splash.
///
/// A direct hit deals the projectile's own damage. Splash only applies when a
/// rocket detonates against a wall or at the end of its lifetime.
fn system_projectiles(world: &mut World, dt: f32) {
    let target = player_proxy(world);
    let mut projectiles = std::mem::take(&mut world.resource_mut::<ProjectileList>().0);
    let mut damage = 0.0;
    let mut events = Vec::new();

    {
        let grid = world
            .resource::<ArenaGrid>()
            .0
            .as_ref()
            .map(|g| g as &dyn Grid);

        projectiles.retain_mut(|p| {
            let outcome = projectile::step_projectile(p, dt, grid);

            if let Some((_, t)) = &target {
                if p.hits_circle(t.x, t.y, t.radius) {
                    damage += p.damage;
                    if let Some(event) = explosion(p) {
                        events.push(event);
                    }
                    return false;
                }
            }

            match outcome {
                StepOutcome::Flying => true,
                StepOutcome::Expired | StepOutcome::HitWall => {
                    if let Some(event) = explosion(p) {
                        if let Some((_, t)) = &target {
                            damage += p.splash_damage_to(t.x, t.y, t.radius);
                        }
                        events.push(event);
                    }
                    false
                }
            }
        });
    }

    world.resource_mut::<ProjectileList>().0 = projectiles;
    if let Some((player, _)) = target {
        hurt_player(world, player, damage, (0.0, 0.0), &mut events);
    }
    world.resource_mut::<OutgoingEvents>().events.extend(events);
}

fn explosion(p: &Projectile) -> Option<GameEvent> {
    match p.kind {
        ProjectileKind::Rocket { splash_radius, .. } => Some(GameEvent::RocketExploded {
            x: p.x,
            y: p.y,
            radius: splash_radius,
        }),
        ProjectileKind::Standard => None,
    }
}

/// Mark the player dead once their health runs out.
fn system_player_death(world: &mut World) {
    let fallen: Vec<Entity> = world
        .query_filtered::<(Entity, &Health), (With<Player>, Without<Dead>)>()
        .iter(world)
        .filter(|(_, health)| health.current <= 0.0)
        .map(|(entity, _)| entity)
        .collect();

    for entity in fallen {
        world.entity_mut(entity).insert(Dead);
        world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::PlayerDefeated);
        info!("player defeated");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
