#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative spin state management for the Fortune Wheel.
//!
//! A [`Wheel`] owns at most one live [`SpinSession`] and walks it through
//! `Idle → Spinning → Resolved`, with `Spinning → Cancelled` as the alternate
//! exit. Callers either invoke the transition methods directly or submit
//! [`Command`] values through [`apply`], which reports the outcome as
//! [`Event`] values.

mod resolve;
mod session;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fortune_wheel_core::{
    Command, Event, PrizeId, PrizeSet, SelectionModel, SessionId, SpinError, SpinOperation,
    SpinOutcome, SpinPhase, SpinResult, WheelConfig,
};
use fortune_wheel_system_geometry::{angle_for_prize, normalize_degrees};
use fortune_wheel_system_selection::{rng_fn, Selector};
use fortune_wheel_system_validation::validate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use resolve::{resolve_spin, validate_distribution};
pub use session::{OverrideTimer, SpinSession};

/// Source of wall-clock timestamps in milliseconds since the Unix epoch.
pub type Clock = fn() -> u64;

/// Reads the system clock.
#[must_use]
pub fn system_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}

/// Represents the authoritative wheel state.
#[derive(Debug)]
pub struct Wheel {
    config: WheelConfig,
    session: Option<SpinSession>,
    last_session: SessionId,
    pending_override: Option<OverrideTimer>,
    resting_angle: f64,
    selector: Selector,
    rng: ChaCha8Rng,
    clock: Clock,
}

impl Default for Wheel {
    fn default() -> Self {
        Self::new()
    }
}

impl Wheel {
    /// Creates an idle wheel with the default configuration and a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Creates an idle wheel whose random draws are fully determined by `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: WheelConfig::default(),
            session: None,
            last_session: SessionId::default(),
            pending_override: None,
            resting_angle: 0.0,
            selector: Selector::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: system_clock_ms,
        }
    }

    /// Replaces the configuration at construction time.
    #[must_use]
    pub fn with_config(mut self, config: WheelConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the timestamp source at construction time.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the configuration used by subsequent spins.
    ///
    /// A session already in flight keeps the revolutions it started with.
    pub fn configure(&mut self, config: WheelConfig) {
        self.config = config;
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    /// Current lifecycle phase; `Idle` before the first spin.
    #[must_use]
    pub fn phase(&self) -> SpinPhase {
        self.session
            .as_ref()
            .map_or(SpinPhase::Idle, SpinSession::phase)
    }

    /// Starts a spin, drawing randomness from the wheel's own generator.
    pub fn start(
        &mut self,
        prizes: PrizeSet,
        model: SelectionModel,
        forced: Option<PrizeId>,
    ) -> Result<SpinOutcome, SpinError> {
        self.admit_start(&prizes, model)?;
        let base_revolutions = self.config.angle_base;
        let outcome = resolve::draw_outcome(
            &mut self.selector,
            &prizes,
            model,
            forced,
            base_revolutions,
            rng_fn(&mut self.rng),
        )
        .map_err(|error| reject(SpinOperation::Start, error))?;
        Ok(self.begin_session(prizes, model, base_revolutions, outcome))
    }

    /// Starts a spin, drawing randomness from the injected `rng`.
    pub fn start_with<F>(
        &mut self,
        prizes: PrizeSet,
        model: SelectionModel,
        forced: Option<PrizeId>,
        rng: F,
    ) -> Result<SpinOutcome, SpinError>
    where
        F: FnMut() -> f64,
    {
        self.admit_start(&prizes, model)?;
        let base_revolutions = self.config.angle_base;
        let outcome = resolve::draw_outcome(
            &mut self.selector,
            &prizes,
            model,
            forced,
            base_revolutions,
            rng,
        )
        .map_err(|error| reject(SpinOperation::Start, error))?;
        Ok(self.begin_session(prizes, model, base_revolutions, outcome))
    }

    /// Schedules a change of destination for the spinning session.
    ///
    /// The override applies once the configured delay elapses through
    /// [`Wheel::advance`], or when the spin ends, whichever comes first. Any
    /// override still waiting is superseded and returned.
    pub fn override_prize(&mut self, prize_id: PrizeId) -> Result<Option<PrizeId>, SpinError> {
        let session = self
            .spinning_session(SpinOperation::Override)
            .map_err(misuse)?;
        if !session.prizes.contains(prize_id) {
            return Err(reject(
                SpinOperation::Override,
                SpinError::InvalidPrizeId(prize_id),
            ));
        }

        let timer = OverrideTimer {
            session: session.id,
            prize_id,
            remaining: self.config.override_delay(),
        };
        tracing::debug!(
            session = %timer.session,
            prize = %prize_id,
            delay_ms = self.config.override_delay_ms,
            "override scheduled"
        );
        let superseded = self.pending_override.replace(timer);
        Ok(superseded.map(|previous| previous.prize_id))
    }

    /// Releases the scheduled override, if any, without applying it.
    ///
    /// Calling this with nothing scheduled is a no-op.
    pub fn cancel_override(&mut self) -> Option<PrizeId> {
        self.pending_override.take().map(|timer| timer.prize_id)
    }

    /// Advances the override timer by `dt`, applying the override once it elapses.
    pub fn advance(&mut self, dt: Duration) -> Option<SpinOutcome> {
        let elapsed = self.pending_override.as_mut()?.elapse(dt);
        if elapsed {
            self.flush_override()
        } else {
            None
        }
    }

    /// Resolves the spinning session once the external animation completed.
    ///
    /// An override still waiting on its delay is applied first. The committed
    /// rotation is folded into `[0, 360)` to become the wheel's resting angle.
    pub fn end(&mut self) -> Result<SpinResult, SpinError> {
        let _ = self.spinning_session(SpinOperation::End).map_err(misuse)?;
        let _ = self.flush_override();

        let timestamp = (self.clock)();
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| misuse(invalid_transition(SpinOperation::End, SpinPhase::Idle)))?;
        let outcome = session
            .outcome
            .ok_or_else(|| misuse(invalid_transition(SpinOperation::End, session.phase)))?;
        let result = SpinResult::new(session.id, outcome, timestamp);
        session.phase = SpinPhase::Resolved;
        session.result = Some(result);
        self.resting_angle = normalize_degrees(outcome.target_angle_degrees);

        tracing::info!(
            session = %result.session(),
            prize = %result.prize_id(),
            angle = result.target_angle_degrees(),
            "spin resolved"
        );
        Ok(result)
    }

    /// Abandons the spinning session, discarding its pending outcome.
    ///
    /// Returns whether a spin was cancelled. Cancelling when nothing is
    /// spinning is a no-op.
    pub fn cancel(&mut self) -> bool {
        let session = match self.session.as_mut() {
            Some(session) if session.is_spinning() => session,
            _ => {
                tracing::debug!(phase = %self.phase(), "cancel ignored, nothing is spinning");
                return false;
            }
        };

        session.phase = SpinPhase::Cancelled;
        session.outcome = None;
        let id = session.id;
        self.pending_override = None;
        tracing::info!(session = %id, "spin cancelled");
        true
    }

    fn admit_start(&self, prizes: &PrizeSet, model: SelectionModel) -> Result<(), SpinError> {
        if let Some(session) = self.session.as_ref().filter(|session| session.is_spinning()) {
            return Err(reject(
                SpinOperation::Start,
                SpinError::AlreadySpinning {
                    session: session.id,
                },
            ));
        }
        if self.config.disabled {
            return Err(reject(SpinOperation::Start, SpinError::Disabled));
        }

        let report = validate(prizes, model);
        for warning in report.warnings() {
            tracing::warn!(%warning, "prize distribution warning");
        }
        let _report = report
            .into_result()
            .map_err(|error| reject(SpinOperation::Start, error))?;
        Ok(())
    }

    fn begin_session(
        &mut self,
        prizes: PrizeSet,
        model: SelectionModel,
        base_revolutions: f64,
        outcome: SpinOutcome,
    ) -> SpinOutcome {
        let id = self.last_session.next();
        self.last_session = id;
        self.pending_override = None;
        self.session = Some(SpinSession::spinning(
            id,
            prizes,
            model,
            base_revolutions,
            outcome,
        ));

        tracing::info!(
            session = %id,
            prize = %outcome.prize_id,
            angle = outcome.target_angle_degrees,
            "spin started"
        );
        outcome
    }

    fn spinning_session(&self, operation: SpinOperation) -> Result<&SpinSession, SpinError> {
        match self.session.as_ref() {
            Some(session) if session.is_spinning() => Ok(session),
            _ => Err(invalid_transition(operation, self.phase())),
        }
    }

    fn flush_override(&mut self) -> Option<SpinOutcome> {
        let timer = self.pending_override.take()?;
        let session = self.session.as_mut()?;
        if !session.is_spinning() || session.id != timer.session {
            tracing::debug!(session = %timer.session, "stale override dropped");
            return None;
        }

        let target_angle_degrees =
            match angle_for_prize(&session.prizes, timer.prize_id, session.base_revolutions) {
                Ok(angle) => angle,
                Err(error) => {
                    tracing::warn!(%error, "override could not be applied");
                    return None;
                }
            };
        let outcome = SpinOutcome {
            prize_id: timer.prize_id,
            target_angle_degrees,
        };
        session.outcome = Some(outcome);

        tracing::info!(
            session = %session.id,
            prize = %outcome.prize_id,
            angle = outcome.target_angle_degrees,
            "override applied"
        );
        Some(outcome)
    }
}

fn invalid_transition(operation: SpinOperation, phase: SpinPhase) -> SpinError {
    SpinError::InvalidTransition { operation, phase }
}

fn reject(operation: SpinOperation, error: SpinError) -> SpinError {
    tracing::warn!(%operation, %error, "spin request rejected");
    error
}

fn misuse(error: SpinError) -> SpinError {
    tracing::error!(%error, "spin operation called in the wrong phase");
    error
}

/// Applies the provided command to the wheel, mutating state deterministically.
///
/// Rejected commands leave the wheel untouched and surface as
/// [`Event::SpinRejected`].
pub fn apply(wheel: &mut Wheel, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureWheel { config } => wheel.configure(config),
        Command::StartSpin {
            prizes,
            model,
            request,
        } => match wheel.start(prizes, model, request.prize_id) {
            Ok(outcome) => out_events.push(Event::SpinStarted {
                session: wheel.last_session,
                outcome,
            }),
            Err(reason) => out_events.push(Event::SpinRejected {
                operation: SpinOperation::Start,
                reason,
            }),
        },
        Command::OverridePrize { prize_id } => match wheel.override_prize(prize_id) {
            Ok(superseded) => {
                let session = wheel.last_session;
                if let Some(previous) = superseded {
                    out_events.push(Event::OverrideDiscarded {
                        session,
                        prize_id: previous,
                    });
                }
                out_events.push(Event::OverrideScheduled {
                    session,
                    prize_id,
                    delay: wheel.config.override_delay(),
                });
            }
            Err(reason) => out_events.push(Event::SpinRejected {
                operation: SpinOperation::Override,
                reason,
            }),
        },
        Command::CancelOverride => {
            let session = wheel.pending_override.map(|timer| timer.session);
            if let (Some(session), Some(prize_id)) = (session, wheel.cancel_override()) {
                out_events.push(Event::OverrideDiscarded { session, prize_id });
            }
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            if let Some(outcome) = wheel.advance(dt) {
                out_events.push(Event::OverrideApplied {
                    session: wheel.last_session,
                    outcome,
                });
            }
        }
        Command::EndSpin => {
            if let Some(outcome) = wheel.flush_override() {
                out_events.push(Event::OverrideApplied {
                    session: wheel.last_session,
                    outcome,
                });
            }
            match wheel.end() {
                Ok(result) => out_events.push(Event::SpinResolved { result }),
                Err(reason) => out_events.push(Event::SpinRejected {
                    operation: SpinOperation::End,
                    reason,
                }),
            }
        }
        Command::CancelSpin => {
            let released = wheel.pending_override;
            if wheel.cancel() {
                let session = wheel.last_session;
                if let Some(timer) = released {
                    out_events.push(Event::OverrideDiscarded {
                        session,
                        prize_id: timer.prize_id,
                    });
                }
                out_events.push(Event::SpinCancelled { session });
            }
        }
    }
}

/// Query functions that provide read-only access to the wheel state.
pub mod query {
    use fortune_wheel_core::{Prize, SessionId, SpinOutcome, SpinPhase};

    use super::{OverrideTimer, SpinSession, Wheel};

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(wheel: &Wheel) -> SpinPhase {
        wheel.phase()
    }

    /// Most recent session, whether live or finished.
    #[must_use]
    pub fn session(wheel: &Wheel) -> Option<&SpinSession> {
        wheel.session.as_ref()
    }

    /// Identifier of the most recent session, if any spin was ever accepted.
    #[must_use]
    pub fn session_id(wheel: &Wheel) -> Option<SessionId> {
        wheel.session.as_ref().map(SpinSession::id)
    }

    /// Outcome the spinning session is heading toward.
    #[must_use]
    pub fn pending_outcome(wheel: &Wheel) -> Option<SpinOutcome> {
        wheel
            .session
            .as_ref()
            .filter(|session| session.is_spinning())
            .and_then(SpinSession::outcome)
    }

    /// Override waiting on its coalescing delay.
    #[must_use]
    pub fn pending_override(wheel: &Wheel) -> Option<OverrideTimer> {
        wheel.pending_override
    }

    /// Prize the most recent session is heading toward or landed on.
    #[must_use]
    pub fn current_prize(wheel: &Wheel) -> Option<&Prize> {
        let session = wheel.session.as_ref()?;
        let outcome = session.outcome()?;
        session.prizes().get(outcome.prize_id)
    }

    /// Angle in `[0, 360)` the wheel rests at after its last resolved spin.
    #[must_use]
    pub fn resting_angle(wheel: &Wheel) -> f64 {
        wheel.resting_angle
    }

    /// Reports whether a new spin would be admitted, ignoring prize validity.
    #[must_use]
    pub fn can_spin(wheel: &Wheel) -> bool {
        !wheel.config.disabled && wheel.phase() != SpinPhase::Spinning
    }
}
