//! Boss output channels: discrete events, minion spawn requests, and damage numbers.

use std::sync::mpsc;

use serde::Serialize;

use super::attack::AttackKind;

/// Discrete notifications for audio, VFX, and game-state hooks. Drained every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BossEvent {
    /// An attack was chosen and its windup began.
    AttackWindup { kind: AttackKind, duration_ms: f32 },
    PhaseTransition { phase: u8 },
    ContactHit { damage: f32 },
    Slam { x: f32, y: f32, radius: f32, hit: bool },
    Stomp { x: f32, y: f32, radius: f32, hit: bool },
    Charge { dir_x: f32, dir_y: f32 },
    DashStrike { dir_x: f32, dir_y: f32 },
    Summon { count: u32 },
    Clone { count: u32 },
    Fan { count: u32 },
    PlasmaFan { count: u32 },
    VolleyShot { shot: u32 },
    Ring { count: u32 },
    Shockwave { count: u32 },
    RocketFire { aim_x: f32, aim_y: f32 },
    BarrageShot { shot: u32 },
    BombardmentTelegraph { targets: Vec<(f32, f32)> },
    BombardmentImpact { targets: Vec<(f32, f32)>, hit: bool },
    LeapStart { to_x: f32, to_y: f32 },
    LeapLand { x: f32, y: f32, radius: f32, hit: bool },
    LaserStart { angle: f32 },
    LaserHit { damage: f32 },
    LaserEnd,
    EmpBlast { x: f32, y: f32, radius: f32, hit: bool },
    /// Health reached zero. Emitted once.
    Defeated { x: f32, y: f32 },
}

impl BossEvent {
    /// Stable snake_case name for hooks keyed by string.
    pub fn name(&self) -> &'static str {
        match self {
            BossEvent::AttackWindup { .. } => "attack_windup",
            BossEvent::PhaseTransition { .. } => "phase_transition",
            BossEvent::ContactHit { .. } => "contact_hit",
            BossEvent::Slam { .. } => "slam",
            BossEvent::Stomp { .. } => "stomp",
            BossEvent::Charge { .. } => "charge",
            BossEvent::DashStrike { .. } => "dash_strike",
            BossEvent::Summon { .. } => "summon",
            BossEvent::Clone { .. } => "clone",
            BossEvent::Fan { .. } => "fan",
            BossEvent::PlasmaFan { .. } => "plasma_fan",
            BossEvent::VolleyShot { .. } => "volley_shot",
            BossEvent::Ring { .. } => "ring",
            BossEvent::Shockwave { .. } => "shockwave",
            BossEvent::RocketFire { .. } => "rocket_fire",
            BossEvent::BarrageShot { .. } => "barrage_shot",
            BossEvent::BombardmentTelegraph { .. } => "bombardment_telegraph",
            BossEvent::BombardmentImpact { .. } => "bombardment_impact",
            BossEvent::LeapStart { .. } => "leap_start",
            BossEvent::LeapLand { .. } => "leap_land",
            BossEvent::LaserStart { .. } => "laser_start",
            BossEvent::LaserHit { .. } => "laser_hit",
            BossEvent::LaserEnd => "laser_end",
            BossEvent::EmpBlast { .. } => "emp_blast",
            BossEvent::Defeated { .. } => "defeated",
        }
    }
}

/// What a spawn request should create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    Minion,
    /// A decoy copy of the boss.
    Decoy,
}

/// A minion the host should spawn this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpawnRequest {
    pub x: f32,
    pub y: f32,
    pub kind: SpawnKind,
}

/// A damage number for the floating-text layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageEvent {
    pub x: f32,
    pub y: f32,
    pub amount: f32,
    pub is_crit: bool,
}

/// Producer half of the damage-number channel, handed to each boss at construction.
///
/// Clones share one feed, so any number of bosses can report into it.
#[derive(Debug, Clone)]
pub struct DamageSink(mpsc::Sender<DamageEvent>);

/// Consumer half of the damage-number channel, owned by the UI layer.
#[derive(Debug)]
pub struct DamageFeed(mpsc::Receiver<DamageEvent>);

/// Create a connected sink/feed pair.
pub fn damage_channel() -> (DamageSink, DamageFeed) {
    let (tx, rx) = mpsc::channel();
    (DamageSink(tx), DamageFeed(rx))
}

impl DamageSink {
    /// Record a damage number. Dropped silently if the feed is gone.
    pub fn record(&self, event: DamageEvent) {
        let _ = self.0.send(event);
    }
}

impl DamageFeed {
    /// Take everything recorded since the last drain.
    pub fn drain(&self) -> Vec<DamageEvent> {
        self.0.try_iter().collect()
    }
}
