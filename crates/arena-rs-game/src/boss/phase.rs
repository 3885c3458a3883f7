//! Two-level phase escalation driven by a health threshold.

use serde::Serialize;
use tracing::info;

use super::attack::AttackState;
use super::controller::BossController;
use super::events::BossEvent;

/// Fraction of max health at or below which phase 2 begins.
pub const PHASE_TWO_HEALTH_FRACTION: f32 = 0.5;

/// Windup and cooldown multiplier while in phase 2.
pub const PHASE_TWO_TEMPO: f32 = 0.7;

/// Share of the base cooldown left on the clock right after spawning.
pub const SPAWN_COOLDOWN_FRACTION: f32 = 0.4;

/// Share of the base cooldown left on the clock right after escalating.
pub const TRANSITION_COOLDOWN_FRACTION: f32 = 0.3;

/// Cosmetic hold after escalating, in milliseconds.
pub const TRANSITION_HOLD_MS: f32 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Phase {
    One,
    Two,
}

impl Phase {
    pub fn number(self) -> u8 {
        match self {
            Phase::One => 1,
            Phase::Two => 2,
        }
    }

    /// Scale applied to windups and cooldowns.
    pub fn tempo(self) -> f32 {
        match self {
            Phase::One => 1.0,
            Phase::Two => PHASE_TWO_TEMPO,
        }
    }
}

/// Whether a boss in `phase` with the given health should escalate.
pub fn should_escalate(phase: Phase, health: f32, max_health: f32) -> bool {
    phase == Phase::One && health <= PHASE_TWO_HEALTH_FRACTION * max_health
}

impl BossController {
    /// Escalate to phase 2 if the threshold has been crossed.
    ///
    /// Cancels any attack in progress regardless of its stage. Never fires twice.
    pub(super) fn check_phase_transition(&mut self) -> bool {
        if !should_escalate(self.phase, self.health, self.stats.max_health) {
            return false;
        }

        let cancelled = self.attack.kind();
        self.phase = Phase::Two;
        self.attack = AttackState::Idle;
        self.attack_cooldown_ms = self.def().base_cooldown_ms * TRANSITION_COOLDOWN_FRACTION;
        self.phase_transition_timer_ms = TRANSITION_HOLD_MS;
        self.events.push(BossEvent::PhaseTransition {
            phase: Phase::Two.number(),
        });

        info!(
            archetype = %self.archetype,
            health = self.health,
            cancelled = ?cancelled.map(|k| k.name()),
            "boss entered phase 2"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalates_at_half_health() {
        assert!(should_escalate(Phase::One, 50.0, 100.0));
        assert!(should_escalate(Phase::One, 10.0, 100.0));
        assert!(!should_escalate(Phase::One, 50.1, 100.0));
    }

    #[test]
    fn never_escalates_from_phase_two() {
        assert!(!should_escalate(Phase::Two, 0.0, 100.0));
    }

    #[test]
    fn tempo_tightens_in_phase_two() {
        assert_eq!(Phase::One.tempo(), 1.0);
        assert!((Phase::Two.tempo() - 0.7).abs() < 1e-6);
        assert!(Phase::Two > Phase::One);
    }
}
