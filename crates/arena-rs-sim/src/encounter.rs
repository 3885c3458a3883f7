//! Headless encounter run: a scripted player circles the boss and chips at it.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};

use serde::Serialize;
use tracing::{debug, info};

use arena_rs_game::boss::{BossEvent, BossSpawn, Phase};
use arena_rs_game::game_world::{ArenaWorld, GameEvent};
use arena_rs_game::grid::Grid;

use crate::config::SimConfig;

/// Distance the scripted player tries to keep from the boss.
const ORBIT_RADIUS: f32 = 180.0;
/// How hard the player corrects toward the orbit, per unit of error.
const ORBIT_CORRECTION: f32 = 2.0;

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    BossDefeated,
    PlayerDefeated,
    TimeUp,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::BossDefeated => "boss defeated",
            Outcome::PlayerDefeated => "player defeated",
            Outcome::TimeUp => "time up",
        })
    }
}

/// End-of-run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub outcome: Outcome,
    pub ticks: u64,
    pub seconds: f32,
    pub phase_reached: Phase,
    /// Windups started, keyed by attack name.
    pub attacks: BTreeMap<&'static str, u32>,
    pub minions_spawned: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

impl Summary {
    fn new() -> Self {
        Self {
            outcome: Outcome::TimeUp,
            ticks: 0,
            seconds: 0.0,
            phase_reached: Phase::One,
            attacks: BTreeMap::new(),
            minions_spawned: 0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Boss {
                event: BossEvent::AttackWindup { kind, .. },
                ..
            } => *self.attacks.entry(kind.name()).or_insert(0) += 1,
            GameEvent::Boss {
                event: BossEvent::PhaseTransition { .. },
                ..
            } => self.phase_reached = Phase::Two,
            GameEvent::MinionSpawned { .. } => self.minions_spawned += 1,
            GameEvent::PlayerHurt { damage, .. } => self.damage_taken += damage,
            _ => {}
        }
    }
}

#[derive(Serialize)]
struct LogLine<'a> {
    tick: u64,
    event: &'a GameEvent,
}

/// Player velocity that circles the boss while holding [`ORBIT_RADIUS`].
pub fn strafe_velocity(player: (f32, f32), boss: (f32, f32), speed: f32) -> (f32, f32) {
    let dx = player.0 - boss.0;
    let dy = player.1 - boss.1;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < f32::EPSILON {
        return (speed, 0.0);
    }
    let (nx, ny) = (dx / dist, dy / dist);
    let radial = ((ORBIT_RADIUS - dist) * ORBIT_CORRECTION).clamp(-speed, speed);
    // Counter-clockwise tangent plus a radial pull back onto the orbit.
    (-ny * speed + nx * radial, nx * speed + ny * radial)
}

/// Run one encounter to completion.
pub fn run(config: &SimConfig) -> Result<Summary, Box<dyn std::error::Error>> {
    let archetype = config.archetype()?;
    let grid = config.arena.build_grid()?;
    let (width, height) = grid.world_size();
    let boss_at = grid
        .boss_spawn()
        .unwrap_or((width * 0.7, height * 0.5));
    let player_at = grid
        .player_spawn()
        .unwrap_or((width * 0.3, height * 0.5));

    let sim = &config.simulation;
    let encounter = &config.encounter;

    let mut world = ArenaWorld::new(Some(grid));
    world.spawn_player(player_at.0, player_at.1);
    let mut spawn = BossSpawn::new(
        boss_at.0,
        boss_at.1,
        archetype,
        encounter.encounter_index,
        encounter.stage,
    );
    if let Some(theme) = &encounter.theme {
        spawn = spawn.with_theme(theme.clone());
    }
    if let Some(seed) = encounter.seed {
        spawn = spawn.with_seed(seed);
    }
    let boss = world.spawn_boss(spawn);

    let mut log = match &sim.event_log {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let dt = 1.0 / sim.tick_rate as f32;
    let max_ticks = (sim.max_seconds * sim.tick_rate as f32).ceil() as u64;
    let mut summary = Summary::new();

    info!(
        archetype = %archetype,
        encounter = encounter.encounter_index,
        stage = encounter.stage,
        max_ticks,
        "encounter started"
    );

    while summary.ticks < max_ticks {
        if let (Some(player), Some(target)) = (world.player(), world.boss(boss)) {
            let (vx, vy) = strafe_velocity(player.position, target.position, sim.player_strafe_speed);
            world.set_player_velocity(vx, vy);
        }
        world.damage_entity(boss, sim.player_dps * dt, 0.0, 0.0, false);

        world.tick(dt);
        summary.ticks += 1;

        for event in world.drain_events() {
            summary.record(&event);
            if let Some(out) = log.as_mut() {
                serde_json::to_writer(
                    &mut *out,
                    &LogLine {
                        tick: summary.ticks,
                        event: &event,
                    },
                )?;
                out.write_all(b"\n")?;
            }
        }
        summary.damage_dealt += world
            .drain_damage_numbers()
            .iter()
            .map(|d| d.amount)
            .sum::<f32>();

        let boss_down = world.boss(boss).map_or(true, |b| b.dead);
        let player_down = world.player().map_or(true, |p| p.dead);
        if boss_down || player_down {
            summary.outcome = if boss_down {
                Outcome::BossDefeated
            } else {
                Outcome::PlayerDefeated
            };
            world.remove_dead_bosses();
            break;
        }
    }

    if let Some(mut out) = log {
        out.flush()?;
    }
    summary.seconds = summary.ticks as f32 * dt;
    debug!(ticks = summary.ticks, "encounter loop finished");
    info!(outcome = %summary.outcome, seconds = summary.seconds, "encounter over");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &str) -> SimConfig {
        let toml_str = format!(
            r#"
            [encounter]
            archetype = "brute"
            seed = 4

            [logging]
            level = "warn"

            {extra}
        "#
        );
        SimConfig::parse(&toml_str).unwrap()
    }

    #[test]
    fn strafe_is_tangent_on_orbit() {
        let (vx, vy) = strafe_velocity((180.0, 0.0), (0.0, 0.0), 90.0);
        assert!(vx.abs() < 1e-4);
        assert!((vy - 90.0).abs() < 1e-4);
    }

    #[test]
    fn strafe_pulls_back_toward_orbit() {
        // Too close: pushed outward.
        let (vx, _) = strafe_velocity((50.0, 0.0), (0.0, 0.0), 90.0);
        assert!(vx > 0.0);
        // Too far: pulled inward.
        let (vx, _) = strafe_velocity((600.0, 0.0), (0.0, 0.0), 90.0);
        assert!(vx < 0.0);
    }

    #[test]
    fn strafe_handles_overlap() {
        assert_eq!(strafe_velocity((5.0, 5.0), (5.0, 5.0), 90.0), (90.0, 0.0));
    }

    #[test]
    fn overwhelming_damage_ends_quickly() {
        let config = config(
            r#"
            [simulation]
            player_dps = 1000000.0
            "#,
        );
        let summary = run(&config).unwrap();
        assert_eq!(summary.outcome, Outcome::BossDefeated);
        assert_eq!(summary.ticks, 1);
        assert!(summary.damage_dealt > 0.0);
    }

    #[test]
    fn time_limit_stops_the_run() {
        let config = config(
            r#"
            [simulation]
            player_dps = 0.0
            max_seconds = 2.0
            "#,
        );
        let summary = run(&config).unwrap();
        assert_eq!(summary.outcome, Outcome::TimeUp);
        assert_eq!(summary.ticks, 120);
        assert!((summary.seconds - 2.0).abs() < 1e-3);
        assert_eq!(summary.phase_reached, Phase::One);
    }

    #[test]
    fn steady_damage_reaches_phase_two() {
        let config = config(
            r#"
            [simulation]
            player_dps = 60.0
            max_seconds = 60.0
            "#,
        );
        let summary = run(&config).unwrap();
        assert_eq!(summary.phase_reached, Phase::Two);
        assert!(!summary.attacks.is_empty());
    }

    #[test]
    fn bad_map_is_an_error() {
        let config = config(
            r#"
            [arena]
            map = ".x."
            "#,
        );
        assert!(run(&config).is_err());
    }
}
