#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure validation system that gates every selection on a well-formed prize distribution.

use std::collections::HashSet;

use fortune_wheel_core::{
    PrizeSet, SelectionModel, ValidationIssue, ValidationReport, ValidationWarning,
    MAX_RECOMMENDED_PRIZES, MIN_RECOMMENDED_PRIZES, PROBABILITY_TOLERANCE, PROBABILITY_TOTAL,
};

/// Checks the prize set's declared odds under `model` before any selection happens.
///
/// An empty set is reported on its own; every other check runs in full so the
/// caller sees all issues at once. Warnings never affect validity.
#[must_use]
pub fn validate(prizes: &PrizeSet, model: SelectionModel) -> ValidationReport {
    if prizes.is_empty() {
        return ValidationReport::from_parts(vec![ValidationIssue::EmptyPrizeSet], Vec::new());
    }

    let mut errors = Vec::new();
    let warnings = size_warnings(prizes.len());

    let total = prizes.total(model);
    match model {
        SelectionModel::Weight => {
            if total == 0.0 {
                errors.push(ValidationIssue::ZeroTotalWeight);
            } else if !total.is_finite() {
                errors.push(ValidationIssue::NonFiniteTotalWeight);
            }
        }
        SelectionModel::Probability => {
            if !total.is_finite() || (total - PROBABILITY_TOTAL).abs() > PROBABILITY_TOLERANCE {
                errors.push(ValidationIssue::ProbabilityTotal { total });
            }
        }
    }

    let mut seen = HashSet::with_capacity(prizes.len());
    for (index, prize) in prizes.iter().enumerate() {
        if !prize.id.is_positive() {
            errors.push(ValidationIssue::NonPositiveId { index });
        } else if !seen.insert(prize.id) {
            errors.push(ValidationIssue::DuplicateId {
                index,
                id: prize.id,
            });
        }

        if !prize.has_display_value() {
            errors.push(ValidationIssue::MissingDisplayValue { index });
        }

        match model {
            SelectionModel::Weight => {
                if !is_valid_weight(prize.weight) {
                    errors.push(ValidationIssue::InvalidWeight { index });
                }
            }
            SelectionModel::Probability => {
                if !is_valid_probability(prize.probability) {
                    errors.push(ValidationIssue::InvalidProbability { index });
                }
            }
        }
    }

    ValidationReport::from_parts(errors, warnings)
}

fn size_warnings(count: usize) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    if count < MIN_RECOMMENDED_PRIZES {
        warnings.push(ValidationWarning::TooFewPrizes { count });
    }
    if count > MAX_RECOMMENDED_PRIZES {
        warnings.push(ValidationWarning::TooManyPrizes { count });
    }
    warnings
}

fn is_valid_probability(probability: Option<f64>) -> bool {
    probability.map_or(false, |value| {
        value.is_finite() && (0.0..=PROBABILITY_TOTAL).contains(&value)
    })
}

fn is_valid_weight(weight: Option<f64>) -> bool {
    weight.map_or(false, |value| value.is_finite() && value >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_probability, is_valid_weight, size_warnings};
    use fortune_wheel_core::ValidationWarning;

    #[test]
    fn probability_bounds_are_inclusive() {
        assert!(is_valid_probability(Some(0.0)));
        assert!(is_valid_probability(Some(100.0)));
        assert!(!is_valid_probability(Some(100.01)));
        assert!(!is_valid_probability(Some(-0.5)));
        assert!(!is_valid_probability(Some(f64::NAN)));
        assert!(!is_valid_probability(None));
    }

    #[test]
    fn weights_must_be_finite_and_non_negative() {
        assert!(is_valid_weight(Some(0.0)));
        assert!(is_valid_weight(Some(1e6)));
        assert!(!is_valid_weight(Some(-1.0)));
        assert!(!is_valid_weight(Some(f64::INFINITY)));
        assert!(!is_valid_weight(None));
    }

    #[test]
    fn size_warnings_cover_both_bounds() {
        assert_eq!(
            size_warnings(1),
            vec![ValidationWarning::TooFewPrizes { count: 1 }]
        );
        assert!(size_warnings(2).is_empty());
        assert!(size_warnings(12).is_empty());
        assert_eq!(
            size_warnings(13),
            vec![ValidationWarning::TooManyPrizes { count: 13 }]
        );
    }
}
