//! Winbook Core - season win projection and market edge engine.
//!
//! This crate provides:
//! - Spread ↔ probability ↔ American odds conversions ([`odds`])
//! - Exact win-count distributions over a fixed remaining-game horizon
//!   ([`distribution`])
//! - Schedule-adjusted team strength and schedule luck via a damped
//!   fixed-point solver ([`schedule_strength`])
//! - Model-vs-book edge, EV and Kelly sizing for win-total markets
//!   ([`market_edge`])
//! - Batch per-team processing via rayon
//!
//! The engine is deterministic and synchronous. Callers hand in an immutable
//! [`AnalysisInput`] snapshot (schedule, records, user spreads, completed
//! results, market board are all plain data) and get back a freshly built
//! [`AnalysisOutput`]; there is no process-wide state. Rendering and
//! persistence of either side of that boundary belong to the caller.

pub mod distribution;
pub mod error;
pub mod market_edge;
pub mod models;
pub mod odds;
pub mod schedule_strength;

use chrono::Utc;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

pub use error::{CoreError, Result};
pub use models::*;
pub use odds::NEUTRAL_SPREAD;

/// Per-game home-win probabilities for the remaining schedule: the user's
/// spread when present, a coin flip otherwise. Non-finite spreads are
/// rejected up front so bad input cannot leak into the distributions.
fn remaining_game_probs(input: &AnalysisInput) -> Result<Vec<GameProb>> {
    input
        .schedule
        .iter()
        .map(|fixture| {
            let home_win_prob = match input.spreads.get(&fixture.id) {
                Some(&spread) => odds::home_win_prob_from_spread(spread)?,
                None => 0.5,
            };
            Ok(GameProb {
                home: fixture.home.clone(),
                away: fixture.away.clone(),
                home_win_prob,
            })
        })
        .collect()
}

/// Compute win distributions for every team the user has made at least one
/// pick for.
///
/// Each team's probability list follows schedule order and is padded with
/// coin flips up to the horizon; teams untouched by any pick are omitted,
/// since a distribution built purely from padding says nothing.
pub fn compute_projections(input: &AnalysisInput) -> Result<Vec<TeamProjection>> {
    let mut probs_by_team: FxHashMap<&str, Vec<f64>> = FxHashMap::default();
    for team in &input.teams {
        probs_by_team.insert(team.id.as_str(), Vec::new());
    }

    let mut touched: FxHashSet<&str> = FxHashSet::default();

    for fixture in &input.schedule {
        let picked = input.spreads.contains_key(&fixture.id);
        let home_prob = match input.spreads.get(&fixture.id) {
            Some(&spread) => odds::home_win_prob_from_spread(spread)?,
            None => 0.5,
        };

        if let Some(list) = probs_by_team.get_mut(fixture.home.as_str()) {
            list.push(home_prob);
            if picked {
                touched.insert(fixture.home.as_str());
            }
        }
        if let Some(list) = probs_by_team.get_mut(fixture.away.as_str()) {
            list.push(1.0 - home_prob);
            if picked {
                touched.insert(fixture.away.as_str());
            }
        }
    }

    // Pad to the horizon so every distribution has the same shape
    for list in probs_by_team.values_mut() {
        while list.len() < input.horizon {
            list.push(0.5);
        }
    }

    input
        .teams
        .par_iter()
        .filter(|team| touched.contains(team.id.as_str()))
        .map(|team| {
            let probs = probs_by_team[team.id.as_str()].clone();
            let exact = distribution::exact_distribution(&probs)?;
            let cumulative = distribution::cumulative_from_exact(&exact);
            let expected_additional_wins: f64 = probs.iter().sum();

            Ok(TeamProjection {
                team_id: team.id.clone(),
                division: team.division.clone(),
                current_wins: team.current_wins,
                probs,
                exact,
                cumulative,
                expected_additional_wins,
                projected_wins: team.current_wins as f64 + expected_additional_wins,
            })
        })
        .collect()
}

/// Full-season game list for the strength solver: completed results as
/// 1.0/0.0 (0.5 for a tie), remaining games at the model probability.
pub fn full_season_games(input: &AnalysisInput) -> Result<Vec<GameProb>> {
    let mut games: Vec<GameProb> = input
        .completed
        .iter()
        .map(|g| GameProb {
            home: g.home.clone(),
            away: g.away.clone(),
            home_win_prob: g.home_win_prob(),
        })
        .collect();
    games.extend(remaining_game_probs(input)?);
    Ok(games)
}

/// Run the whole pipeline on one input snapshot.
///
/// Running this twice on identical inputs yields identical outputs apart
/// from the timestamp.
pub fn analyze(
    input: &AnalysisInput,
    board: &[TeamMarket],
    params: &BetParams,
    solver: &SolverOptions,
) -> Result<AnalysisOutput> {
    let projections = compute_projections(input)?;

    let season = full_season_games(input)?;
    let strength = schedule_strength::compute_schedule_strength(&season, solver);

    let market_by_team: FxHashMap<&str, &TeamMarket> =
        board.iter().map(|m| (m.team_id.as_str(), m)).collect();

    let mut edges = Vec::new();
    for projection in &projections {
        let market = market_by_team.get(projection.team_id.as_str()).copied();
        edges.extend(market_edge::edges_for_team(projection, market, params)?);
    }

    Ok(AnalysisOutput {
        computed_at: Utc::now(),
        projections,
        strength,
        edges,
    })
}
