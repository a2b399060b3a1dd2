//! Schedule-adjusted team strength and schedule luck.
//!
//! Separates "how good is this team" from "how easy was its schedule" using
//! only game outcomes: completed games as probability 1.0/0.0, remaining
//! games as model probabilities. No external ratings.
//!
//! The estimate solves the fixed-point system
//!
//!   observed_win_pct[i] ≈ strength[i] + k * (difficulty[i] - league_avg)
//!
//! where difficulty[i] is the average strength of i's opponents, by damped
//! fixed-point iteration. Each round reads a snapshot of the previous
//! strength vector for every team (Jacobi-style update); letting later teams
//! see mid-round values would change convergence behavior.
//!
//! The iteration is not provably convergent for every schedule graph; the
//! clamp to [0, 1] bounds runaway damping and `max_iter` is a hard safety
//! valve. Exhausting it returns the last iterate with `converged = false`.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::models::{GameProb, ScheduleStrengthReport, SolverOptions, StrengthMetrics};

/// Clamp to [0, 1]; non-finite values collapse to the 0.5 prior.
#[inline]
fn clamp01(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.5;
    }
    x.clamp(0.0, 1.0)
}

/// Compute per-team strength metrics from a full game list.
///
/// Games referencing a team against itself are skipped. Teams that appear in
/// no usable game are absent from the result; teams with zero counted games
/// (possible only via self-games) report a 0.5 observed percentage.
pub fn compute_schedule_strength(
    games: &[GameProb],
    options: &SolverOptions,
) -> ScheduleStrengthReport {
    // 1. Discover teams
    let mut team_ids: Vec<&str> = Vec::new();
    let mut index_by_id: FxHashMap<&str, usize> = FxHashMap::default();
    for g in games {
        for id in [g.home.as_str(), g.away.as_str()] {
            if !index_by_id.contains_key(id) {
                index_by_id.insert(id, team_ids.len());
                team_ids.push(id);
            }
        }
    }
    let n = team_ids.len();
    if n == 0 {
        return ScheduleStrengthReport {
            teams: FxHashMap::default(),
            league_avg_opp_wins_vs_others: 0.0,
            converged: true,
            iterations: 0,
        };
    }

    // 2. Expected-wins and games-played matrices, accumulated across
    //    repeated matchups
    let mut wins = vec![vec![0.0f64; n]; n];
    let mut played = vec![vec![0u32; n]; n];
    let mut opponents: Vec<Vec<usize>> = vec![Vec::new(); n];

    for g in games {
        let hi = index_by_id[g.home.as_str()];
        let ai = index_by_id[g.away.as_str()];
        if hi == ai {
            continue;
        }

        let p_home = clamp01(g.home_win_prob);
        wins[hi][ai] += p_home;
        wins[ai][hi] += 1.0 - p_home;
        played[hi][ai] += 1;
        played[ai][hi] += 1;

        if !opponents[hi].contains(&ai) {
            opponents[hi].push(ai);
        }
        if !opponents[ai].contains(&hi) {
            opponents[ai].push(hi);
        }
    }

    // 3. Totals and observed win percentage
    let mut total_wins = vec![0.0f64; n];
    let mut total_games = vec![0u32; n];
    let mut observed_pct = vec![0.0f64; n];
    for i in 0..n {
        total_wins[i] = wins[i].iter().sum();
        total_games[i] = played[i].iter().sum();
        observed_pct[i] = if total_games[i] > 0 {
            total_wins[i] / total_games[i] as f64
        } else {
            0.5
        };
    }

    // 4. Damped Jacobi iteration for schedule-adjusted strength
    let mut strength = observed_pct.clone();
    let mut difficulty = vec![0.5f64; n];
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..options.max_iter {
        iterations = iter + 1;
        let prev = strength.clone();

        for i in 0..n {
            difficulty[i] = if opponents[i].is_empty() {
                0.5
            } else {
                opponents[i].iter().map(|&j| prev[j]).sum::<f64>() / opponents[i].len() as f64
            };
        }
        let league_avg_difficulty = difficulty.iter().sum::<f64>() / n as f64;

        let mut max_delta = 0.0f64;
        for i in 0..n {
            let next = clamp01(observed_pct[i] - options.k * (difficulty[i] - league_avg_difficulty));
            max_delta = max_delta.max((next - prev[i]).abs());
            strength[i] = next;
        }

        if max_delta < options.tol {
            converged = true;
            debug!("strength solver converged after {} iterations", iterations);
            break;
        }
    }

    if !converged {
        warn!(
            "strength solver hit max_iter={} without reaching tol={}; returning last iterate",
            options.max_iter, options.tol
        );
    }

    // 5. Descriptive SoS: opponent win totals excluding games against i
    let mut opp_avg_wins_vs_others = vec![0.0f64; n];
    let mut opp_avg_win_pct_vs_others = vec![0.5f64; n];
    let mut league_sum = 0.0f64;
    let mut league_count = 0usize;

    for i in 0..n {
        if opponents[i].is_empty() {
            opp_avg_wins_vs_others[i] = 0.0;
            opp_avg_win_pct_vs_others[i] = 0.5;
            continue;
        }

        let mut sum_wins = 0.0;
        let mut sum_pct = 0.0;
        for &j in &opponents[i] {
            let wins_excl = total_wins[j] - wins[j][i];
            let games_excl = total_games[j] - played[j][i];
            let pct_excl = if games_excl > 0 {
                wins_excl / games_excl as f64
            } else {
                0.5
            };

            sum_wins += wins_excl;
            sum_pct += pct_excl;
            league_sum += wins_excl;
            league_count += 1;
        }
        let count = opponents[i].len() as f64;
        opp_avg_wins_vs_others[i] = sum_wins / count;
        opp_avg_win_pct_vs_others[i] = sum_pct / count;
    }

    let league_avg_opp_wins_vs_others = if league_count > 0 {
        league_sum / league_count as f64
    } else {
        0.0
    };

    // 6. Assemble per-team metrics
    let mut teams = FxHashMap::default();
    for i in 0..n {
        let games_i = total_games[i];
        let neutral_pct = strength[i];
        let luck_pct = observed_pct[i] - neutral_pct;

        teams.insert(
            team_ids[i].to_string(),
            StrengthMetrics {
                team_id: team_ids[i].to_string(),
                games: games_i,
                observed_wins: total_wins[i],
                observed_win_pct: observed_pct[i],
                neutral_win_pct: neutral_pct,
                neutral_wins: neutral_pct * games_i as f64,
                schedule_luck_win_pct: luck_pct,
                schedule_luck_wins: luck_pct * games_i as f64,
                difficulty: difficulty[i],
                opp_avg_wins_vs_others: opp_avg_wins_vs_others[i],
                opp_avg_win_pct_vs_others: opp_avg_win_pct_vs_others[i],
            },
        );
    }

    ScheduleStrengthReport {
        teams,
        league_avg_opp_wins_vs_others,
        converged,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(home: &str, away: &str, p: f64) -> GameProb {
        GameProb {
            home: home.to_string(),
            away: away.to_string(),
            home_win_prob: p,
        }
    }

    /// Round-robin league where every game is a coin flip.
    fn coin_flip_league() -> Vec<GameProb> {
        let ids = ["A", "B", "C", "D"];
        let mut games = Vec::new();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                games.push(game(ids[i], ids[j], 0.5));
            }
        }
        games
    }

    /// Asymmetric league with repeated matchups and mixed results.
    fn uneven_league() -> Vec<GameProb> {
        vec![
            game("A", "B", 1.0),
            game("B", "A", 0.0), // A sweeps the season series
            game("A", "C", 1.0),
            game("C", "D", 1.0),
            game("D", "B", 0.0),
            game("C", "B", 0.7),
            game("D", "A", 0.2),
        ]
    }

    #[test]
    fn test_empty_game_list() {
        let report = compute_schedule_strength(&[], &SolverOptions::default());
        assert!(report.teams.is_empty());
        assert!(report.converged);
    }

    #[test]
    fn test_balanced_league_neutral_equals_observed() {
        // Everyone's opponents sit at strength 0.5, so difficulty matches the
        // league average and nothing moves: neutral == observed.
        let report = compute_schedule_strength(&coin_flip_league(), &SolverOptions::default());
        assert!(report.converged);
        for m in report.teams.values() {
            assert_eq!(m.games, 3);
            assert!((m.observed_win_pct - 0.5).abs() < 1e-12);
            assert!((m.difficulty - 0.5).abs() < 1e-12);
            assert!((m.neutral_win_pct - m.observed_win_pct).abs() < 1e-9);
            assert!(m.schedule_luck_wins.abs() < 1e-9);
        }
    }

    #[test]
    fn test_accumulates_repeated_matchups() {
        let games = vec![game("A", "B", 1.0), game("B", "A", 0.0)];
        let report = compute_schedule_strength(&games, &SolverOptions::default());
        let a = &report.teams["A"];
        let b = &report.teams["B"];
        assert_eq!(a.games, 2);
        assert_eq!(a.observed_wins, 2.0);
        assert_eq!(b.observed_wins, 0.0);
        assert_eq!(a.observed_win_pct, 1.0);
    }

    #[test]
    fn test_probabilistic_wins_count_fractionally() {
        let games = vec![game("A", "B", 0.7)];
        let report = compute_schedule_strength(&games, &SolverOptions::default());
        assert!((report.teams["A"].observed_wins - 0.7).abs() < 1e-12);
        assert!((report.teams["B"].observed_wins - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_strengths_stay_in_unit_interval() {
        let opts = SolverOptions {
            k: 4.0, // aggressive damping, clamp must hold
            ..SolverOptions::default()
        };
        let report = compute_schedule_strength(&uneven_league(), &opts);
        for m in report.teams.values() {
            assert!((0.0..=1.0).contains(&m.neutral_win_pct));
            assert!((0.0..=1.0).contains(&m.difficulty));
        }
    }

    #[test]
    fn test_idempotent_across_runs() {
        let games = uneven_league();
        let opts = SolverOptions::default();
        let first = compute_schedule_strength(&games, &opts);
        let second = compute_schedule_strength(&games, &opts);
        for (id, m1) in &first.teams {
            let m2 = &second.teams[id];
            assert_eq!(m1.neutral_win_pct, m2.neutral_win_pct);
            assert_eq!(m1.difficulty, m2.difficulty);
        }
        assert_eq!(first.iterations, second.iterations);
    }

    #[test]
    fn test_luck_identity() {
        let report = compute_schedule_strength(&uneven_league(), &SolverOptions::default());
        for m in report.teams.values() {
            let luck = m.observed_win_pct - m.neutral_win_pct;
            assert!((m.schedule_luck_win_pct - luck).abs() < 1e-12);
            assert!((m.schedule_luck_wins - luck * m.games as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn test_excluded_opponent_stats() {
        // B's record excluding games vs A: one 0.3 expected win vs C in 1 game.
        let games = vec![game("A", "B", 1.0), game("C", "B", 0.7)];
        let report = compute_schedule_strength(&games, &SolverOptions::default());

        let a = &report.teams["A"];
        // A's only opponent is B; B excluding A is 0.3 wins in 1 game.
        assert!((a.opp_avg_wins_vs_others - 0.3).abs() < 1e-12);
        assert!((a.opp_avg_win_pct_vs_others - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_max_iter_exhaustion_flags_non_convergence() {
        let opts = SolverOptions {
            max_iter: 1,
            tol: 1e-12,
            ..SolverOptions::default()
        };
        let report = compute_schedule_strength(&uneven_league(), &opts);
        assert!(!report.converged);
        assert_eq!(report.iterations, 1);
        // Still returns a usable last iterate
        assert!(!report.teams.is_empty());
    }

    #[test]
    fn test_self_game_skipped() {
        let games = vec![game("A", "A", 1.0), game("A", "B", 0.5)];
        let report = compute_schedule_strength(&games, &SolverOptions::default());
        assert_eq!(report.teams["A"].games, 1);
    }

    #[test]
    fn test_non_finite_probability_collapses_to_half() {
        let games = vec![game("A", "B", f64::NAN)];
        let report = compute_schedule_strength(&games, &SolverOptions::default());
        assert!((report.teams["A"].observed_wins - 0.5).abs() < 1e-12);
    }
}
