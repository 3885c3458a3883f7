//! Attack kinds, execution stages, and per-attack payloads.

use serde::{Deserialize, Serialize};

/// Every attack a boss can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Slam,
    Stomp,
    Charge,
    DashStrike,
    Summon,
    Clone,
    Fan,
    PlasmaFan,
    Volley,
    Ring,
    Shockwave,
    Rocket,
    Barrage,
    Bombardment,
    Leap,
    LaserSweep,
    EmpBlast,
}

/// Execution stage of the boss's attack state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackStage {
    Idle,
    Windup,
    Active,
    Recovery,
}

/// When an attack captures its targeting parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLock {
    /// Nothing is locked; effects query the target live.
    None,
    /// Heading toward the target, captured when the windup ends.
    DirectionAtActivation,
    /// The target's position, captured when the windup starts.
    PositionAtWindup,
    /// A set of sampled floor points, captured when the windup starts.
    PointsAtWindup,
    /// Beam start angle and sweep direction, captured when the windup starts.
    SweepAtWindup,
}

/// Static per-kind behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindProfile {
    pub lock: TargetLock,
    /// Pause after the effect ends, in milliseconds.
    pub recovery_ms: f32,
}

impl AttackKind {
    pub const ALL: [AttackKind; 17] = [
        AttackKind::Slam,
        AttackKind::Stomp,
        AttackKind::Charge,
        AttackKind::DashStrike,
        AttackKind::Summon,
        AttackKind::Clone,
        AttackKind::Fan,
        AttackKind::PlasmaFan,
        AttackKind::Volley,
        AttackKind::Ring,
        AttackKind::Shockwave,
        AttackKind::Rocket,
        AttackKind::Barrage,
        AttackKind::Bombardment,
        AttackKind::Leap,
        AttackKind::LaserSweep,
        AttackKind::EmpBlast,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttackKind::Slam => "slam",
            AttackKind::Stomp => "stomp",
            AttackKind::Charge => "charge",
            AttackKind::DashStrike => "dash_strike",
            AttackKind::Summon => "summon",
            AttackKind::Clone => "clone",
            AttackKind::Fan => "fan",
            AttackKind::PlasmaFan => "plasma_fan",
            AttackKind::Volley => "volley",
            AttackKind::Ring => "ring",
            AttackKind::Shockwave => "shockwave",
            AttackKind::Rocket => "rocket",
            AttackKind::Barrage => "barrage",
            AttackKind::Bombardment => "bombardment",
            AttackKind::Leap => "leap",
            AttackKind::LaserSweep => "laser_sweep",
            AttackKind::EmpBlast => "emp_blast",
        }
    }

    pub fn profile(self) -> KindProfile {
        let (lock, recovery_ms) = match self {
            AttackKind::Slam => (TargetLock::None, 500.0),
            AttackKind::Stomp => (TargetLock::None, 600.0),
            AttackKind::Charge => (TargetLock::DirectionAtActivation, 500.0),
            AttackKind::DashStrike => (TargetLock::DirectionAtActivation, 400.0),
            AttackKind::Summon => (TargetLock::None, 600.0),
            AttackKind::Clone => (TargetLock::None, 500.0),
            AttackKind::Fan | AttackKind::PlasmaFan => (TargetLock::None, 500.0),
            AttackKind::Volley => (TargetLock::None, 400.0),
            AttackKind::Ring => (TargetLock::None, 500.0),
            AttackKind::Shockwave => (TargetLock::None, 600.0),
            AttackKind::Rocket => (TargetLock::None, 400.0),
            AttackKind::Barrage => (TargetLock::None, 500.0),
            AttackKind::Bombardment => (TargetLock::PointsAtWindup, 500.0),
            AttackKind::Leap => (TargetLock::PositionAtWindup, 700.0),
            AttackKind::LaserSweep => (TargetLock::SweepAtWindup, 600.0),
            AttackKind::EmpBlast => (TargetLock::None, 600.0),
        };
        KindProfile { lock, recovery_ms }
    }
}

/// Transient state owned by the attack in progress. Only the active kind's fields exist.
#[derive(Debug, Clone, PartialEq)]
pub enum AttackPayload {
    None,
    /// Charge / dash strike: heading locked at activation.
    Dash { dir_x: f32, dir_y: f32 },
    /// Volley / barrage: shots fired so far and time to the next one.
    Repeat {
        fired: u32,
        max: u32,
        until_next_ms: f32,
    },
    /// Bombardment impact points sampled at windup start.
    Bombardment { targets: Vec<(f32, f32)> },
    /// Leap landing point captured at windup start.
    Leap { target: (f32, f32) },
    /// Laser sweep geometry captured at windup start.
    Sweep {
        start_angle: f32,
        /// `+1.0` or `-1.0`.
        direction: f32,
        arc: f32,
        /// Current beam angle.
        angle: f32,
        duration_ms: f32,
    },
}

/// The attack currently being executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAttack {
    pub kind: AttackKind,
    /// Never [`AttackStage::Idle`].
    pub stage: AttackStage,
    /// Single countdown whose meaning depends on `stage`:
    /// windup = ms until activation, active = ms until the effect ends,
    /// recovery = ms until the boss returns to idle.
    pub timer_ms: f32,
    pub payload: AttackPayload,
}

/// Idle, or exactly one attack in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttackState {
    #[default]
    Idle,
    Engaged(ActiveAttack),
}

impl AttackState {
    pub fn stage(&self) -> AttackStage {
        match self {
            AttackState::Idle => AttackStage::Idle,
            AttackState::Engaged(a) => a.stage,
        }
    }

    pub fn kind(&self) -> Option<AttackKind> {
        match self {
            AttackState::Idle => None,
            AttackState::Engaged(a) => Some(a.kind),
        }
    }

    pub fn payload(&self) -> Option<&AttackPayload> {
        match self {
            AttackState::Idle => None,
            AttackState::Engaged(a) => Some(&a.payload),
        }
    }
}
