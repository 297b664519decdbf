//! Clamping and rounding helpers shared by the rules, pricing, and billing code.
//!
//! Every amount in the engine is a [`Decimal`]. Inputs that arrive as floats
//! (CLI flags, raw JSON leads) pass through [`clamp_float`], which never fails:
//! non-finite values collapse to the lower bound.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Upper bound for a lead budget, in currency units.
pub const BUDGET_MAX: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Upper bound for a lead quantity, in metres or units.
pub const QTY_MAX: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Upper bound for an invoice total passed to the deposit calculation.
pub const DEPOSIT_TOTAL_MAX: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

pub fn clamp_decimal(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    value.max(min).min(max)
}

pub fn clamp_float(value: f64, min: Decimal, max: Decimal) -> Decimal {
    if !value.is_finite() {
        return min;
    }

    match Decimal::from_f64(value) {
        Some(decimal) => clamp_decimal(decimal, min, max),
        None if value > 0.0 => max,
        None => min,
    }
}

/// Parses an unsigned decimal literal such as `20`, `1.8`, or `1500`.
///
/// Literals too large for [`Decimal`] resolve to `overflow`, so callers can
/// clamp them like any other oversized amount.
pub fn parse_amount(literal: &str, overflow: Decimal) -> Option<Decimal> {
    let literal = literal.trim();
    let well_formed = literal.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
        && literal.chars().any(|ch| ch.is_ascii_digit())
        && literal.matches('.').count() <= 1;
    if !well_formed {
        return None;
    }

    Some(literal.parse::<Decimal>().unwrap_or(overflow))
}

/// Rounds to the nearest multiple of ten, half away from zero.
///
/// Values too close to [`Decimal::MAX`] saturate to the largest representable
/// multiple of ten with the same sign.
pub fn round_to_ten(value: Decimal) -> Decimal {
    let tens = (value / Decimal::TEN)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    match tens.checked_mul(Decimal::TEN) {
        Some(rounded) => rounded.normalize(),
        None => {
            let bound = (Decimal::MAX / Decimal::TEN).trunc() * Decimal::TEN;
            if tens.is_sign_negative() {
                -bound
            } else {
                bound
            }
        }
    }
}

/// Rounds to whole currency units, half away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero).normalize()
}

pub fn mul_saturating(left: Decimal, right: Decimal) -> Decimal {
    left.checked_mul(right).unwrap_or(Decimal::MAX)
}
