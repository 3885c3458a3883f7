//! Boss archetype definitions and their attack pools.
//!
//! Every archetype carries base stat multipliers, a body radius, a base attack
//! cooldown, a default cosmetic theme, and an ordered attack pool. Pool order
//! matters: weighted selection breaks ties in table order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::attack::AttackKind;
use crate::error::GameError;

/// One of the five boss templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Brute,
    Warlock,
    Phantom,
    Siegebreaker,
    Sentinel,
}

/// An entry in an archetype's attack pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackEntry {
    pub kind: AttackKind,
    /// Relative selection weight.
    pub weight: f32,
    /// Windup length in milliseconds before phase scaling.
    pub windup_ms: f32,
}

/// Static description of an archetype.
#[derive(Debug)]
pub struct ArchetypeDef {
    pub archetype: Archetype,
    pub display_name: &'static str,
    pub health_mult: f32,
    pub speed_mult: f32,
    pub damage_mult: f32,
    pub collision_radius: f32,
    /// Cooldown between attacks in milliseconds before phase scaling.
    pub base_cooldown_ms: f32,
    pub default_theme: &'static str,
    pub attacks: &'static [AttackEntry],
}

const fn entry(kind: AttackKind, weight: f32, windup_ms: f32) -> AttackEntry {
    AttackEntry {
        kind,
        weight,
        windup_ms,
    }
}

static BRUTE: ArchetypeDef = ArchetypeDef {
    archetype: Archetype::Brute,
    display_name: "Brute",
    health_mult: 1.3,
    speed_mult: 0.85,
    damage_mult: 1.2,
    collision_radius: 30.0,
    base_cooldown_ms: 2200.0,
    default_theme: "rust",
    attacks: &[
        entry(AttackKind::Slam, 2.5, 800.0),
        entry(AttackKind::Charge, 2.0, 700.0),
        entry(AttackKind::Stomp, 1.0, 1000.0),
        entry(AttackKind::Leap, 1.5, 900.0),
    ],
};

static WARLOCK: ArchetypeDef = ArchetypeDef {
    archetype: Archetype::Warlock,
    display_name: "Warlock",
    health_mult: 0.9,
    speed_mult: 0.9,
    damage_mult: 1.0,
    collision_radius: 22.0,
    base_cooldown_ms: 2000.0,
    default_theme: "violet",
    attacks: &[
        entry(AttackKind::Fan, 2.5, 700.0),
        entry(AttackKind::Volley, 2.0, 600.0),
        entry(AttackKind::Summon, 1.0, 900.0),
        entry(AttackKind::Ring, 1.5, 800.0),
    ],
};

static PHANTOM: ArchetypeDef = ArchetypeDef {
    archetype: Archetype::Phantom,
    display_name: "Phantom",
    health_mult: 0.8,
    speed_mult: 1.35,
    damage_mult: 1.1,
    collision_radius: 20.0,
    base_cooldown_ms: 1800.0,
    default_theme: "ashen",
    attacks: &[
        entry(AttackKind::DashStrike, 2.5, 450.0),
        entry(AttackKind::Clone, 1.0, 800.0),
        entry(AttackKind::Fan, 1.5, 600.0),
        entry(AttackKind::Leap, 1.5, 700.0),
    ],
};

static SIEGEBREAKER: ArchetypeDef = ArchetypeDef {
    archetype: Archetype::Siegebreaker,
    display_name: "Siegebreaker",
    health_mult: 1.5,
    speed_mult: 0.7,
    damage_mult: 1.3,
    collision_radius: 34.0,
    base_cooldown_ms: 2600.0,
    default_theme: "ochre",
    attacks: &[
        entry(AttackKind::Bombardment, 2.0, 1200.0),
        entry(AttackKind::Rocket, 2.5, 700.0),
        entry(AttackKind::Shockwave, 1.5, 900.0),
        entry(AttackKind::Stomp, 1.0, 1000.0),
    ],
};

static SENTINEL: ArchetypeDef = ArchetypeDef {
    archetype: Archetype::Sentinel,
    display_name: "Sentinel",
    health_mult: 1.1,
    speed_mult: 1.0,
    damage_mult: 1.15,
    collision_radius: 26.0,
    base_cooldown_ms: 2200.0,
    default_theme: "cobalt",
    attacks: &[
        entry(AttackKind::LaserSweep, 2.0, 1000.0),
        entry(AttackKind::Barrage, 2.0, 800.0),
        entry(AttackKind::PlasmaFan, 2.0, 700.0),
        entry(AttackKind::EmpBlast, 1.0, 900.0),
    ],
};

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Brute,
        Archetype::Warlock,
        Archetype::Phantom,
        Archetype::Siegebreaker,
        Archetype::Sentinel,
    ];

    /// Static definition for this archetype.
    pub fn def(self) -> &'static ArchetypeDef {
        match self {
            Archetype::Brute => &BRUTE,
            Archetype::Warlock => &WARLOCK,
            Archetype::Phantom => &PHANTOM,
            Archetype::Siegebreaker => &SIEGEBREAKER,
            Archetype::Sentinel => &SENTINEL,
        }
    }

    /// Ordered attack pool.
    pub fn attacks(self) -> &'static [AttackEntry] {
        self.def().attacks
    }

    pub fn name(self) -> &'static str {
        self.def().display_name
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Archetype {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Archetype::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GameError::UnknownArchetype(s.to_string()))
    }
}
