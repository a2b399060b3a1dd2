//! Model-vs-book comparison for win-total markets.
//!
//! Pure calculators: Over/Under probabilities from a team's win distribution,
//! expected value on a fixed stake, fractional-Kelly stake sizing, and the
//! per-team edge rows that line those up against a sportsbook board.
//!
//! Probabilities reaching this module must already be well-formed; anything
//! outside [0, 1] is rejected rather than clamped, since clamping here would
//! hide a modeling bug upstream.

use rustc_hash::FxHashMap;

use crate::error::{check_probability, Result};
use crate::models::{BetParams, EdgeRow, SideEdge, TeamMarket, TeamProjection, WinTotalLine};
use crate::odds::prob_from_american;

/// P(final wins > line) for a half-integer win-total line.
///
/// Over 9.5 means at least 10 total wins; the answer is read straight off the
/// exact distribution of additional wins.
pub fn probability_over_line(projection: &TeamProjection, line: f64) -> f64 {
    let horizon = projection.horizon() as i64;
    let required = line.floor() as i64 + 1 - projection.current_wins as i64;

    if required <= 0 {
        return 1.0;
    }
    if required > horizon {
        return 0.0;
    }
    projection.exact[required as usize..].iter().sum()
}

/// P(final wins < line); the complement framing of [`probability_over_line`].
pub fn probability_under_line(projection: &TeamProjection, line: f64) -> f64 {
    let horizon = projection.horizon() as i64;
    let max_additional = line.floor() as i64 - projection.current_wins as i64;

    if max_additional < 0 {
        return 0.0;
    }
    if max_additional >= horizon {
        return 1.0;
    }
    projection.exact[..=max_additional as usize].iter().sum()
}

/// Net expected profit on `stake` at the given American odds and model
/// probability. The stake itself is excluded from the figure.
pub fn ev_on_stake(american_odds: i32, model_prob: f64, stake: f64) -> Result<f64> {
    check_probability(model_prob)?;

    let win_mult = if american_odds > 0 {
        american_odds as f64 / 100.0
    } else {
        100.0 / american_odds.unsigned_abs() as f64
    };

    Ok(model_prob * win_mult * stake - (1.0 - model_prob) * stake)
}

/// Fractional-Kelly stake for a bet at American odds.
///
/// Returns 0 when the edge is non-positive (no bet).
pub fn kelly_stake(
    american_odds: i32,
    model_prob: f64,
    bankroll: f64,
    kelly_fraction: f64,
) -> Result<f64> {
    check_probability(model_prob)?;

    let b = if american_odds > 0 {
        american_odds as f64 / 100.0
    } else {
        100.0 / american_odds.unsigned_abs() as f64
    };

    let q = 1.0 - model_prob;
    let frac = (b * model_prob - q) / b;
    if frac <= 0.0 {
        return Ok(0.0);
    }
    Ok(frac * bankroll * kelly_fraction)
}

/// One side of a line, fully evaluated against the book's price.
fn side_edge(american_odds: i32, model_prob: f64, params: &BetParams) -> Result<SideEdge> {
    let book_prob = prob_from_american(american_odds);
    Ok(SideEdge {
        american_odds,
        book_prob,
        model_prob,
        edge: model_prob - book_prob,
        ev_on_stake: ev_on_stake(american_odds, model_prob, params.stake)?,
        kelly_stake: kelly_stake(american_odds, model_prob, params.bankroll, params.kelly_fraction)?,
    })
}

/// Half-integer totals only exist on a 0.5 grid; key them by doubled value so
/// float totals can be compared exactly.
#[inline]
fn line_key(total: f64) -> i64 {
    (total * 2.0).round() as i64
}

/// Edge rows for one team: candidate lines at `current_wins + k - 0.5` for
/// k = 1..=horizon, matched against the team's market board entry. Lines the
/// book does not offer produce rows with absent sides; sparse boards are
/// normal, not an error.
pub fn edges_for_team(
    projection: &TeamProjection,
    market: Option<&TeamMarket>,
    params: &BetParams,
) -> Result<Vec<EdgeRow>> {
    let by_line: FxHashMap<i64, &WinTotalLine> = market
        .map(|m| m.markets.iter().map(|l| (line_key(l.total), l)).collect())
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(projection.horizon());
    for k in 1..=projection.horizon() {
        let line = projection.current_wins as f64 + k as f64 - 0.5;

        let (over, under) = match by_line.get(&line_key(line)) {
            Some(quote) => {
                let p_over = probability_over_line(projection, line);
                let p_under = probability_under_line(projection, line);
                (
                    Some(side_edge(quote.over, p_over, params)?),
                    Some(side_edge(quote.under, p_under, params)?),
                )
            }
            None => (None, None),
        };

        rows.push(EdgeRow {
            team_id: projection.team_id.clone(),
            line,
            over,
            under,
        });
    }

    Ok(rows)
}
