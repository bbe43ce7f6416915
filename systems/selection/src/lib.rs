#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure selection system that draws a winning prize under either selection model.
//!
//! Randomness is always injected as a `FnMut() -> f64` source yielding values in
//! `[0, 1)`, so a fixed source reproduces the exact same draws. Values outside
//! that range are clamped into it.

use fortune_wheel_core::{
    PrizeId, PrizeSet, SelectionModel, SpinError, MAX_PROBABILITY_DECIMALS,
};
use rand::Rng;

/// Adapts any `rand` generator into the unit-interval source consumed by this crate.
pub fn rng_fn<R: Rng>(rng: &mut R) -> impl FnMut() -> f64 + '_ {
    move || rng.gen::<f64>()
}

/// Number of fractional digits in the shortest decimal rendering of `value`.
#[must_use]
pub fn decimal_places(value: f64) -> u32 {
    let rendered = value.to_string();
    rendered
        .split_once('.')
        .map_or(0, |(_, fraction)| u32::try_from(fraction.len()).unwrap_or(u32::MAX))
}

/// Precision scale shared by every probability of the set.
///
/// The scale is `10^d` where `d` is the largest fractional digit count across
/// all declared probabilities, capped at [`MAX_PROBABILITY_DECIMALS`].
#[must_use]
pub fn probability_scale(prizes: &PrizeSet) -> u64 {
    let digits = prizes
        .iter()
        .filter_map(|prize| prize.probability)
        .map(decimal_places)
        .max()
        .unwrap_or(0)
        .min(MAX_PROBABILITY_DECIMALS);
    10_u64.pow(digits)
}

/// Integer sampling space that emulates a flat array of repeated prize ids.
///
/// Each prize owns `round(probability * scale)` consecutive slots in sector
/// order. Only cumulative slot counts are stored, so memory stays linear in the
/// number of prizes while slot lookups match the expanded array exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedIndex {
    ids: Vec<PrizeId>,
    cumulative: Vec<u64>,
    scale: u64,
}

impl WeightedIndex {
    /// Expands the probabilities of `prizes` into an integer sampling space.
    #[must_use]
    pub fn build(prizes: &PrizeSet) -> Self {
        let scale = probability_scale(prizes);
        let mut ids = Vec::with_capacity(prizes.len());
        let mut cumulative = Vec::with_capacity(prizes.len());
        let mut running = 0_u64;

        for prize in prizes.iter() {
            let slots = scaled_slots(prize.probability.unwrap_or(0.0), scale);
            running = running.saturating_add(slots);
            ids.push(prize.id);
            cumulative.push(running);
        }

        Self {
            ids,
            cumulative,
            scale,
        }
    }

    /// Precision scale applied to every probability.
    #[must_use]
    pub const fn scale(&self) -> u64 {
        self.scale
    }

    /// Total number of slots in the sampling space.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Reports whether every probability rounded to zero slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots owned by the prize at each sector index.
    pub fn slot_counts(&self) -> impl Iterator<Item = (PrizeId, u64)> + '_ {
        let mut previous = 0_u64;
        self.ids
            .iter()
            .zip(self.cumulative.iter())
            .map(move |(id, total)| {
                let count = total - previous;
                previous = *total;
                (*id, count)
            })
    }

    /// Identifier stored at `slot`, or `None` when the slot is out of range.
    #[must_use]
    pub fn id_at(&self, slot: u64) -> Option<PrizeId> {
        if slot >= self.len() {
            return None;
        }
        let position = self.cumulative.partition_point(|total| *total <= slot);
        self.ids.get(position).copied()
    }

    /// Draws a uniform slot and returns its identifier.
    ///
    /// An empty sampling space falls back to the first prize.
    pub fn sample<F>(&self, mut rng: F) -> Option<PrizeId>
    where
        F: FnMut() -> f64,
    {
        let total = self.len();
        if total == 0 {
            return self.ids.first().copied();
        }
        let slot = (unit(rng()) * total as f64).floor() as u64;
        self.id_at(slot.min(total - 1))
    }
}

/// Picks a winning prize identifier.
///
/// A forced identifier present in the set is returned without consuming any
/// randomness; one absent from the set fails with [`SpinError::InvalidPrizeId`].
/// The prize set is expected to have passed validation.
pub fn select<F>(
    prizes: &PrizeSet,
    model: SelectionModel,
    forced: Option<PrizeId>,
    rng: F,
) -> Result<PrizeId, SpinError>
where
    F: FnMut() -> f64,
{
    if let Some(id) = forced_winner(prizes, forced)? {
        return Ok(id);
    }

    match model {
        SelectionModel::Weight => select_by_weight(prizes, rng),
        SelectionModel::Probability => WeightedIndex::build(prizes)
            .sample(rng)
            .ok_or(SpinError::EmptyPrizeSet),
    }
}

/// Selector that reuses the probability index across draws from an unchanged set.
#[derive(Clone, Debug, Default)]
pub struct Selector {
    cached: Option<CachedIndex>,
}

#[derive(Clone, Debug)]
struct CachedIndex {
    probabilities: Vec<Option<f64>>,
    index: WeightedIndex,
}

impl Selector {
    /// Creates a selector with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks a winning prize identifier, behaving exactly like [`select`].
    pub fn select<F>(
        &mut self,
        prizes: &PrizeSet,
        model: SelectionModel,
        forced: Option<PrizeId>,
        rng: F,
    ) -> Result<PrizeId, SpinError>
    where
        F: FnMut() -> f64,
    {
        if let Some(id) = forced_winner(prizes, forced)? {
            return Ok(id);
        }

        match model {
            SelectionModel::Weight => select_by_weight(prizes, rng),
            SelectionModel::Probability => self
                .index_for(prizes)
                .sample(rng)
                .ok_or(SpinError::EmptyPrizeSet),
        }
    }

    /// Returns the cached index for `prizes`, rebuilding it when the set changed.
    pub fn index_for(&mut self, prizes: &PrizeSet) -> &WeightedIndex {
        let cached = match self.cached.take() {
            Some(cached) if cached.matches(prizes) => cached,
            _ => CachedIndex::build(prizes),
        };
        &self.cached.insert(cached).index
    }
}

impl CachedIndex {
    fn build(prizes: &PrizeSet) -> Self {
        Self {
            probabilities: prizes.iter().map(|prize| prize.probability).collect(),
            index: WeightedIndex::build(prizes),
        }
    }

    fn matches(&self, prizes: &PrizeSet) -> bool {
        self.index.ids.len() == prizes.len()
            && self.probabilities.len() == prizes.len()
            && prizes
                .iter()
                .zip(self.index.ids.iter().zip(&self.probabilities))
                .all(|(prize, (id, probability))| {
                    prize.id == *id && prize.probability == *probability
                })
    }
}

fn forced_winner(prizes: &PrizeSet, forced: Option<PrizeId>) -> Result<Option<PrizeId>, SpinError> {
    match forced {
        Some(id) if prizes.contains(id) => Ok(Some(id)),
        Some(id) => Err(SpinError::InvalidPrizeId(id)),
        None => Ok(None),
    }
}

fn select_by_weight<F>(prizes: &PrizeSet, mut rng: F) -> Result<PrizeId, SpinError>
where
    F: FnMut() -> f64,
{
    let last = prizes.last().ok_or(SpinError::EmptyPrizeSet)?;
    let total = prizes.total(SelectionModel::Weight);
    let mut remainder = unit(rng()) * total;

    for prize in prizes.iter() {
        let weight = prize.weight.unwrap_or(0.0);
        if weight <= 0.0 {
            continue;
        }
        remainder -= weight;
        if remainder <= 0.0 {
            return Ok(prize.id);
        }
    }

    // Floating-point drift at the upper boundary.
    Ok(last.id)
}

fn scaled_slots(probability: f64, scale: u64) -> u64 {
    let scaled = (probability * scale as f64).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u64
    } else {
        0
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
