#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure geometry system that maps prizes onto wheel rotations.
//!
//! Sectors have equal width regardless of odds. Sector `i` of `n` spans
//! `[i * 360 / n, (i + 1) * 360 / n)` degrees with sector 0 starting at the
//! pointer's reference angle.

use fortune_wheel_core::{PrizeId, PrizeSet, SpinError, FULL_TURN_DEGREES};

/// Angular width of each sector on a wheel with `total_prizes` sectors.
pub fn sector_width(total_prizes: usize) -> Result<f64, SpinError> {
    if total_prizes == 0 {
        return Err(SpinError::EmptyPrizeSet);
    }
    Ok(FULL_TURN_DEGREES / total_prizes as f64)
}

/// Angle of the centre of sector `prize_index`, measured from the pointer.
pub fn sector_center(prize_index: usize, total_prizes: usize) -> Result<f64, SpinError> {
    let width = sector_width(total_prizes)?;
    Ok(width * prize_index as f64 + width / 2.0)
}

/// Whole-revolution rotation added before the sector offset.
///
/// Negative revolution counts take one extra turn so they keep the same
/// magnitude convention as positive ones.
#[must_use]
pub fn base_rotation(base_revolutions: f64) -> f64 {
    let angle = base_revolutions * FULL_TURN_DEGREES;
    if base_revolutions < 0.0 {
        angle - FULL_TURN_DEGREES
    } else {
        angle
    }
}

/// Rotation that stops the pointer on the centre of sector `prize_index`.
pub fn target_angle(
    prize_index: usize,
    total_prizes: usize,
    base_revolutions: f64,
) -> Result<f64, SpinError> {
    let center = sector_center(prize_index, total_prizes)?;
    Ok(base_rotation(base_revolutions) + (FULL_TURN_DEGREES - center))
}

/// Rotation that stops the pointer on the prize with identifier `prize_id`.
pub fn angle_for_prize(
    prizes: &PrizeSet,
    prize_id: PrizeId,
    base_revolutions: f64,
) -> Result<f64, SpinError> {
    if prizes.is_empty() {
        return Err(SpinError::EmptyPrizeSet);
    }
    let index = prizes
        .index_of(prize_id)
        .ok_or(SpinError::InvalidPrizeId(prize_id))?;
    target_angle(index, prizes.len(), base_revolutions)
}

/// Folds an angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(angle: f64) -> f64 {
    let folded = angle.rem_euclid(FULL_TURN_DEGREES);
    // rem_euclid may round up to exactly 360 for tiny negative inputs.
    if folded >= FULL_TURN_DEGREES {
        0.0
    } else {
        folded
    }
}
