//! Live state of a single spin.

use std::time::Duration;

use fortune_wheel_core::{
    PrizeId, PrizeSet, SelectionModel, SessionId, SpinOutcome, SpinPhase, SpinResult,
};

/// Lifecycle instance of one spin, from start to resolution or cancellation.
///
/// Sessions are never reused: every accepted start creates a fresh one with a
/// new [`SessionId`].
#[derive(Clone, Debug)]
pub struct SpinSession {
    pub(crate) id: SessionId,
    pub(crate) phase: SpinPhase,
    pub(crate) prizes: PrizeSet,
    pub(crate) model: SelectionModel,
    pub(crate) base_revolutions: f64,
    pub(crate) outcome: Option<SpinOutcome>,
    pub(crate) result: Option<SpinResult>,
}

impl SpinSession {
    pub(crate) fn spinning(
        id: SessionId,
        prizes: PrizeSet,
        model: SelectionModel,
        base_revolutions: f64,
        outcome: SpinOutcome,
    ) -> Self {
        Self {
            id,
            phase: SpinPhase::Spinning,
            prizes,
            model,
            base_revolutions,
            outcome: Some(outcome),
            result: None,
        }
    }

    /// Identifier of the session.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SpinPhase {
        self.phase
    }

    /// Prize set snapshot captured when the session started.
    #[must_use]
    pub fn prizes(&self) -> &PrizeSet {
        &self.prizes
    }

    /// Selection model the session was started with.
    #[must_use]
    pub const fn model(&self) -> SelectionModel {
        self.model
    }

    /// Whole revolutions added to every angle computed for this session.
    #[must_use]
    pub const fn base_revolutions(&self) -> f64 {
        self.base_revolutions
    }

    /// Pending or committed outcome; `None` once the session is cancelled.
    #[must_use]
    pub const fn outcome(&self) -> Option<SpinOutcome> {
        self.outcome
    }

    /// Final result, present only once the session resolved.
    #[must_use]
    pub const fn result(&self) -> Option<SpinResult> {
        self.result
    }

    pub(crate) const fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning)
    }
}

/// Cancellable delay that coalesces bursts of overrides.
///
/// At most one timer exists per wheel. Arming a new one replaces the previous
/// timer, so only the last override in a burst applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverrideTimer {
    pub(crate) session: SessionId,
    pub(crate) prize_id: PrizeId,
    pub(crate) remaining: Duration,
}

impl OverrideTimer {
    /// Session the override was scheduled for.
    #[must_use]
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Prize the override will apply.
    #[must_use]
    pub const fn prize_id(&self) -> PrizeId {
        self.prize_id
    }

    /// Simulated time left before the override applies.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Counts the timer down, reporting whether it elapsed.
    pub(crate) fn elapse(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.remaining.is_zero()
    }
}
