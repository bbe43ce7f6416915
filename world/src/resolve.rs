//! Stateless spin resolution shared by request/response callers and the wheel.

use fortune_wheel_core::{
    PrizeId, PrizeSet, SelectionModel, SpinError, SpinOutcome, ValidationReport,
};
use fortune_wheel_system_geometry::angle_for_prize;
use fortune_wheel_system_selection::Selector;
use fortune_wheel_system_validation::validate;

/// Validates a prize distribution under the widget-level `use_weight` flag.
#[must_use]
pub fn validate_distribution(prizes: &PrizeSet, use_weight: bool) -> ValidationReport {
    validate(prizes, SelectionModel::from_use_weight(use_weight))
}

/// Validates, selects, and computes the target rotation in one pure call.
///
/// Nothing is retained between calls; the only input consumed is `rng`, and
/// only when no forced prize is supplied.
pub fn resolve_spin<F>(
    prizes: &PrizeSet,
    use_weight: bool,
    forced: Option<PrizeId>,
    base_revolutions: f64,
    rng: F,
) -> Result<SpinOutcome, SpinError>
where
    F: FnMut() -> f64,
{
    let model = SelectionModel::from_use_weight(use_weight);
    let _report = validate(prizes, model).into_result()?;
    draw_outcome(
        &mut Selector::new(),
        prizes,
        model,
        forced,
        base_revolutions,
        rng,
    )
}

/// Selects a winner from an already validated set and computes its rotation.
pub(crate) fn draw_outcome<F>(
    selector: &mut Selector,
    prizes: &PrizeSet,
    model: SelectionModel,
    forced: Option<PrizeId>,
    base_revolutions: f64,
    rng: F,
) -> Result<SpinOutcome, SpinError>
where
    F: FnMut() -> f64,
{
    let prize_id = selector.select(prizes, model, forced, rng)?;
    let target_angle_degrees = angle_for_prize(prizes, prize_id, base_revolutions)?;
    Ok(SpinOutcome {
        prize_id,
        target_angle_degrees,
    })
}
