#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Fortune Wheel engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative wheel, and pure systems. Adapters submit [`Command`] values
//! describing desired transitions, the wheel executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. The prize data model, the selection models and
//! the error taxonomy shared by every crate also live here.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Sum that declared probabilities must reach under [`SelectionModel::Probability`].
pub const PROBABILITY_TOTAL: f64 = 100.0;

/// Largest accepted deviation between the probability sum and [`PROBABILITY_TOTAL`].
pub const PROBABILITY_TOLERANCE: f64 = 0.01;

/// Prize counts below this threshold produce a readability warning.
pub const MIN_RECOMMENDED_PRIZES: usize = 2;

/// Prize counts above this threshold produce a readability warning.
pub const MAX_RECOMMENDED_PRIZES: usize = 12;

/// Maximum number of fractional digits honoured when scaling probabilities.
pub const MAX_PROBABILITY_DECIMALS: u32 = 4;

/// Number of degrees in a full wheel revolution.
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Commands that express all permissible wheel transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the wheel configuration used by subsequent spins.
    ConfigureWheel {
        /// Configuration that becomes active for the next spin.
        config: WheelConfig,
    },
    /// Requests that a new spin session begins.
    StartSpin {
        /// Prize set captured as the session's read-only snapshot.
        prizes: PrizeSet,
        /// Selection model applied to the prize set.
        model: SelectionModel,
        /// Optional forced outcome for the spin.
        request: SpinRequest,
    },
    /// Requests that the pending outcome of the active spin changes destination.
    OverridePrize {
        /// Prize that should replace the pending winner.
        prize_id: PrizeId,
    },
    /// Releases a scheduled override without applying it.
    CancelOverride,
    /// Advances the wheel clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that the external animation finished and the spin should resolve.
    EndSpin,
    /// Abandons the active spin without producing a result.
    CancelSpin,
}

/// Events broadcast by the wheel after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new session started spinning toward a pending outcome.
    SpinStarted {
        /// Identifier assigned to the new session.
        session: SessionId,
        /// Outcome committed when the session started.
        outcome: SpinOutcome,
    },
    /// Reports that a command was rejected without changing the wheel state.
    SpinRejected {
        /// Operation that was attempted.
        operation: SpinOperation,
        /// Specific reason the operation failed.
        reason: SpinError,
    },
    /// Confirms that an override was armed and will apply once its delay elapses.
    OverrideScheduled {
        /// Session the override belongs to.
        session: SessionId,
        /// Prize requested by the override.
        prize_id: PrizeId,
        /// Delay remaining before the override applies.
        delay: Duration,
    },
    /// Confirms that an override replaced the pending outcome.
    OverrideApplied {
        /// Session whose pending outcome changed.
        session: SessionId,
        /// Outcome that replaced the previous pending outcome.
        outcome: SpinOutcome,
    },
    /// Reports that a scheduled override was released before applying.
    OverrideDiscarded {
        /// Session the discarded override belonged to.
        session: SessionId,
        /// Prize the discarded override requested.
        prize_id: PrizeId,
    },
    /// Indicates that the wheel clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a spin resolved with a final result.
    SpinResolved {
        /// Immutable result of the completed spin.
        result: SpinResult,
    },
    /// Confirms that a spin was cancelled and its pending outcome discarded.
    SpinCancelled {
        /// Session that was cancelled.
        session: SessionId,
    },
}

/// Unique identifier assigned to a prize within a prize set.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrizeId(u32);

impl PrizeId {
    /// Creates a new prize identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the identifier is strictly positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for PrizeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing identifier assigned to each spin session.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new session identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Chooses which prize field drives selection and which algorithm applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionModel {
    /// Percentages that must sum to one hundred.
    #[default]
    Probability,
    /// Relative non-negative weights with a positive sum.
    Weight,
}

impl SelectionModel {
    /// Maps the widget-level `use_weight` flag onto a selection model.
    #[must_use]
    pub const fn from_use_weight(use_weight: bool) -> Self {
        if use_weight {
            Self::Weight
        } else {
            Self::Probability
        }
    }

    /// Reports whether the model reads prize weights.
    #[must_use]
    pub const fn uses_weight(self) -> bool {
        matches!(self, Self::Weight)
    }
}

/// Presentation metadata attached to a sector. Opaque to the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorStyle {
    /// Label drawn inside the sector.
    pub name: Option<String>,
    /// Fill color of the sector.
    pub background: Option<String>,
    /// Text color of the sector label.
    pub foreground: Option<String>,
}

/// A single prize occupying one sector of the wheel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    /// Identifier of the prize, unique within its set.
    pub id: PrizeId,
    /// Value handed back to the caller when the prize wins.
    #[serde(default)]
    pub display_value: Option<Value>,
    /// Percentage chance used by [`SelectionModel::Probability`].
    #[serde(default)]
    pub probability: Option<f64>,
    /// Relative weight used by [`SelectionModel::Weight`].
    #[serde(default)]
    pub weight: Option<f64>,
    /// Sector presentation metadata.
    #[serde(default)]
    pub style: SectorStyle,
}

impl Prize {
    /// Creates a prize carrying only an identifier and display value.
    #[must_use]
    pub fn new(id: PrizeId, display_value: impl Into<Value>) -> Self {
        Self {
            id,
            display_value: Some(display_value.into()),
            probability: None,
            weight: None,
            style: SectorStyle::default(),
        }
    }

    /// Attaches a percentage chance to the prize.
    #[must_use]
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    /// Attaches a relative weight to the prize.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Attaches sector presentation metadata to the prize.
    #[must_use]
    pub fn with_style(mut self, style: SectorStyle) -> Self {
        self.style = style;
        self
    }

    /// Reports whether the prize carries a usable display value.
    ///
    /// Absent values, `null`, and empty strings all count as missing.
    #[must_use]
    pub fn has_display_value(&self) -> bool {
        match &self.display_value {
            None | Some(Value::Null) => false,
            Some(Value::String(text)) => !text.is_empty(),
            Some(_) => true,
        }
    }

    /// Returns the field that is active under the provided selection model.
    #[must_use]
    pub fn odds(&self, model: SelectionModel) -> Option<f64> {
        match model {
            SelectionModel::Probability => self.probability,
            SelectionModel::Weight => self.weight,
        }
    }
}

/// Ordered prize sequence; order defines each prize's sector on the wheel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrizeSet {
    prizes: Vec<Prize>,
}

impl PrizeSet {
    /// Creates a prize set from prizes listed in sector order.
    #[must_use]
    pub fn new(prizes: Vec<Prize>) -> Self {
        Self { prizes }
    }

    /// Number of prizes, and therefore sectors, in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    /// Reports whether the set contains no prizes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    /// Iterator over the prizes in sector order.
    pub fn iter(&self) -> impl Iterator<Item = &Prize> {
        self.prizes.iter()
    }

    /// Prizes in sector order.
    #[must_use]
    pub fn as_slice(&self) -> &[Prize] {
        &self.prizes
    }

    /// First prize of the set, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Prize> {
        self.prizes.first()
    }

    /// Last prize of the set, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Prize> {
        self.prizes.last()
    }

    /// Looks up a prize by identifier.
    #[must_use]
    pub fn get(&self, id: PrizeId) -> Option<&Prize> {
        self.prizes.iter().find(|prize| prize.id == id)
    }

    /// Sector index of the prize with the provided identifier.
    #[must_use]
    pub fn index_of(&self, id: PrizeId) -> Option<usize> {
        self.prizes.iter().position(|prize| prize.id == id)
    }

    /// Reports whether the set contains the provided identifier.
    #[must_use]
    pub fn contains(&self, id: PrizeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Sum of the field active under `model`, counting missing values as zero.
    #[must_use]
    pub fn total(&self, model: SelectionModel) -> f64 {
        self.prizes
            .iter()
            .map(|prize| prize.odds(model).unwrap_or(0.0))
            .sum()
    }
}

impl From<Vec<Prize>> for PrizeSet {
    fn from(prizes: Vec<Prize>) -> Self {
        Self::new(prizes)
    }
}

/// Caller request describing how the winner of a spin is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinRequest {
    /// Forced winner; `None` selects randomly.
    pub prize_id: Option<PrizeId>,
}

impl SpinRequest {
    /// Request that draws the winner randomly.
    #[must_use]
    pub const fn random() -> Self {
        Self { prize_id: None }
    }

    /// Request that forces the provided winner.
    #[must_use]
    pub const fn forced(prize_id: PrizeId) -> Self {
        Self {
            prize_id: Some(prize_id),
        }
    }
}

/// Winner and rotation produced by a stateless spin resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Identifier of the winning prize.
    pub prize_id: PrizeId,
    /// Rotation that aligns the pointer with the centre of the winning sector.
    pub target_angle_degrees: f64,
}

/// Immutable record of a completed spin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    session: SessionId,
    prize_id: PrizeId,
    target_angle_degrees: f64,
    timestamp_ms: u64,
}

impl SpinResult {
    /// Creates a new result for the provided session and outcome.
    #[must_use]
    pub const fn new(session: SessionId, outcome: SpinOutcome, timestamp_ms: u64) -> Self {
        Self {
            session,
            prize_id: outcome.prize_id,
            target_angle_degrees: outcome.target_angle_degrees,
            timestamp_ms,
        }
    }

    /// Session that produced the result.
    #[must_use]
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Identifier of the winning prize.
    #[must_use]
    pub const fn prize_id(&self) -> PrizeId {
        self.prize_id
    }

    /// Committed rotation the wheel travelled to, before normalisation.
    #[must_use]
    pub const fn target_angle_degrees(&self) -> f64 {
        self.target_angle_degrees
    }

    /// Milliseconds since the Unix epoch at which the spin resolved.
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Winner and rotation carried by the result.
    #[must_use]
    pub const fn outcome(&self) -> SpinOutcome {
        SpinOutcome {
            prize_id: self.prize_id,
            target_angle_degrees: self.target_angle_degrees,
        }
    }
}

/// Lifecycle phase of a spin session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    /// No session is in flight.
    #[default]
    Idle,
    /// A session committed an outcome and the animation is running.
    Spinning,
    /// The session finished and produced a result.
    Resolved,
    /// The session was abandoned without a result.
    Cancelled,
}

impl SpinPhase {
    /// Reports whether the phase ends its session.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }
}

impl fmt::Display for SpinPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Spinning => "spinning",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Operations exposed by the spin state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinOperation {
    /// Starting a new session.
    Start,
    /// Changing the destination of the active session.
    Override,
    /// Resolving the active session.
    End,
    /// Abandoning the active session.
    Cancel,
}

impl fmt::Display for SpinOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Start => "start",
            Self::Override => "override",
            Self::End => "end",
            Self::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

/// Reasons a prize distribution is rejected.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    /// The prize set contained no prizes.
    #[error("prize set must contain at least one prize")]
    EmptyPrizeSet,
    /// A prize identifier was not strictly positive.
    #[error("prize at index {index} must have a valid positive numeric id")]
    NonPositiveId {
        /// Sector index of the offending prize.
        index: usize,
    },
    /// A prize identifier appeared more than once.
    #[error("prize at index {index} reuses id {id}")]
    DuplicateId {
        /// Sector index of the offending prize.
        index: usize,
        /// Identifier that was already taken.
        id: PrizeId,
    },
    /// A prize had no display value.
    #[error("prize at index {index} must have a value")]
    MissingDisplayValue {
        /// Sector index of the offending prize.
        index: usize,
    },
    /// A probability was missing, not finite, or outside `[0, 100]`.
    #[error("prize at index {index} must have a valid probability between 0 and 100")]
    InvalidProbability {
        /// Sector index of the offending prize.
        index: usize,
    },
    /// A weight was missing, not finite, or negative.
    #[error("prize at index {index} must have a valid non-negative weight")]
    InvalidWeight {
        /// Sector index of the offending prize.
        index: usize,
    },
    /// Probabilities did not sum to one hundred within tolerance.
    #[error("total probability must equal 100%, current total: {total}%")]
    ProbabilityTotal {
        /// Observed sum of all probabilities.
        total: f64,
    },
    /// Weights summed to zero.
    #[error("total weight must be greater than 0")]
    ZeroTotalWeight,
    /// Weights were individually finite but their sum overflowed.
    #[error("total weight must be a finite number")]
    NonFiniteTotalWeight,
}

/// Non-fatal observations about a prize distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationWarning {
    /// The wheel has fewer than [`MIN_RECOMMENDED_PRIZES`] sectors.
    #[error("wheel should have at least 2 prizes, found {count}")]
    TooFewPrizes {
        /// Number of prizes in the set.
        count: usize,
    },
    /// The wheel has more than [`MAX_RECOMMENDED_PRIZES`] sectors.
    #[error("wheel with more than 12 prizes may hurt readability, found {count}")]
    TooManyPrizes {
        /// Number of prizes in the set.
        count: usize,
    },
}

/// Outcome of validating a prize distribution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    is_valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Builds a report whose validity follows from the absence of errors.
    #[must_use]
    pub fn from_parts(errors: Vec<ValidationIssue>, warnings: Vec<ValidationWarning>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Reports whether the distribution may be used for selection.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Issues that make the distribution unusable.
    #[must_use]
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// Observations that do not affect validity.
    #[must_use]
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// Converts the report into an error when the distribution is invalid.
    pub fn into_result(self) -> Result<Self, SpinError> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(SpinError::InvalidDistribution {
                issues: self.errors,
            })
        }
    }
}

/// Errors surfaced by selection, geometry, and the spin state machine.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinError {
    /// The prize distribution failed validation.
    #[error("invalid prize distribution: {}", join_issues(.issues))]
    InvalidDistribution {
        /// Every issue reported by the validator.
        issues: Vec<ValidationIssue>,
    },
    /// The requested prize does not belong to the prize set.
    #[error("prize {0} is not part of the prize set")]
    InvalidPrizeId(PrizeId),
    /// An angle was requested for a wheel without sectors.
    #[error("cannot compute a rotation for an empty prize set")]
    EmptyPrizeSet,
    /// A new spin was requested while another one is still spinning.
    #[error("session {session} is already spinning")]
    AlreadySpinning {
        /// Session that is still in flight.
        session: SessionId,
    },
    /// An operation was attempted outside the phase that permits it.
    #[error("cannot {operation} while the wheel is {phase}")]
    InvalidTransition {
        /// Operation that was attempted.
        operation: SpinOperation,
        /// Phase the wheel was in.
        phase: SpinPhase,
    },
    /// The wheel configuration disables spinning.
    #[error("the wheel is disabled")]
    Disabled,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Tunable behaviour of a wheel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Selects [`SelectionModel::Weight`] instead of probabilities.
    pub use_weight: bool,
    /// Extra full revolutions added to every target angle.
    pub angle_base: f64,
    /// Length of the external spin animation in milliseconds.
    pub duration_ms: u64,
    /// Delay that coalesces bursts of overrides, in milliseconds.
    pub override_delay_ms: u64,
    /// Rejects every new spin while set.
    pub disabled: bool,
}

impl WheelConfig {
    /// Selection model implied by [`WheelConfig::use_weight`].
    #[must_use]
    pub const fn model(&self) -> SelectionModel {
        SelectionModel::from_use_weight(self.use_weight)
    }

    /// Override coalescing delay as a [`Duration`].
    #[must_use]
    pub const fn override_delay(&self) -> Duration {
        Duration::from_millis(self.override_delay_ms)
    }

    /// Spin animation length as a [`Duration`].
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            use_weight: false,
            angle_base: 10.0,
            duration_ms: 6_000,
            override_delay_ms: 100,
            disabled: false,
        }
    }
}
