//! Spread / probability / American odds conversions.
//!
//! The spread model is a fixed lookup table keyed at half-integer points from
//! 0.5 through 14.5, calibrated from historical point-spread results. Spreads
//! beyond the table extrapolate at +0.9% per whole point, capped just short
//! of certainty. All functions here are pure and stateless.

use crate::error::{check_finite, Result};

/// Distinguished "no pick made" spread. Maps to exactly 0.5 for the home side.
pub const NEUTRAL_SPREAD: f64 = -0.5;

/// Absolute spread (in tenths of a point) → favorite win probability.
const SPREAD_PROB_TABLE: [(i64, f64); 15] = [
    (5, 0.5),
    (15, 0.509),
    (25, 0.5544),
    (35, 0.6368),
    (45, 0.6514),
    (55, 0.6522),
    (65, 0.6796),
    (75, 0.7377),
    (85, 0.7477),
    (95, 0.7667),
    (105, 0.8042),
    (115, 0.8097),
    (125, 0.8117),
    (135, 0.825),
    (145, 0.8541),
];

const TABLE_MAX_TENTHS: i64 = 145;
const TABLE_MAX_PROB: f64 = 0.8541;
/// Probability gained per whole point of spread beyond the table.
const EXTRAPOLATION_STEP: f64 = 0.009;
const PROB_CAP: f64 = 0.9999;

/// Favorite win probability for an absolute spread.
///
/// The magnitude is clamped to at least 0.5 and rounded to one decimal before
/// lookup. Off-grid values below the table maximum fall back to the 0.5 entry.
fn favorite_prob_from_abs_spread(abs_spread_raw: f64) -> f64 {
    let abs_spread = abs_spread_raw.abs().max(0.5);
    let tenths = (abs_spread * 10.0).round() as i64;

    if let Some(&(_, p)) = SPREAD_PROB_TABLE.iter().find(|(t, _)| *t == tenths) {
        return p;
    }

    if tenths > TABLE_MAX_TENTHS {
        let steps_beyond = ((tenths - TABLE_MAX_TENTHS) as f64 / 10.0).round();
        let prob = TABLE_MAX_PROB + steps_beyond * EXTRAPOLATION_STEP;
        return prob.min(PROB_CAP);
    }

    SPREAD_PROB_TABLE[0].1
}

/// Home-team win probability from a home-perspective point spread.
///
/// Negative spread means the home team is favored. A zero spread goes through
/// the neutral 0.5 table entry. NaN and infinite spreads are rejected.
pub fn home_win_prob_from_spread(spread: f64) -> Result<f64> {
    check_finite("spread", spread)?;

    if spread == 0.0 {
        return Ok(favorite_prob_from_abs_spread(0.5));
    }

    let favorite_prob = favorite_prob_from_abs_spread(spread);
    if spread < 0.0 {
        Ok(favorite_prob)
    } else {
        Ok(1.0 - favorite_prob)
    }
}

/// Convert a probability to American odds.
///
/// Probabilities are clamped to [0.0001, 0.9999] so the odds stay finite;
/// p ≥ 0.5 yields favorite-style (negative) odds.
pub fn american_from_prob(prob: f64) -> Result<i32> {
    check_finite("probability", prob)?;
    let p = prob.clamp(0.0001, 0.9999);

    if p >= 0.5 {
        Ok(-((p / (1.0 - p) * 100.0).round() as i32))
    } else {
        Ok(((1.0 - p) / p * 100.0).round() as i32)
    }
}

/// Book-implied probability from American odds.
pub fn prob_from_american(odds: i32) -> f64 {
    let o = odds as f64;
    if odds > 0 {
        100.0 / (o + 100.0)
    } else {
        -o / (-o + 100.0)
    }
}

/// Format American odds for display: "+150" / "-150".
pub fn format_american(odds: i32) -> String {
    if odds > 0 {
        format!("+{}", odds)
    } else {
        odds.to_string()
    }
}
