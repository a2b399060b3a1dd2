// Shared models for the win projection core
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Schedule & team reference data (supplied by the caller, never mutated)
// ============================================================================

/// One fixture on the remaining schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFixture {
    pub id: u32,
    pub week: u8,
    /// Home team id (e.g. "KC").
    pub home: String,
    /// Away team id.
    pub away: String,
}

/// A team with its record entering the remaining-game horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: String,
    pub name: String,
    pub division: String,
    pub current_wins: u32,
}

/// A finished game with a real score, used to feed the strength solver
/// actual outcomes alongside modeled ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedGame {
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub away_score: u32,
}

impl CompletedGame {
    /// Express the result as a home-win probability: 1.0 / 0.0, or 0.5 for a
    /// tie (half a win to each side).
    pub fn home_win_prob(&self) -> f64 {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Less => 0.0,
            std::cmp::Ordering::Equal => 0.5,
        }
    }
}

/// A single game expressed as a home-win probability. Actual results use
/// probability 1.0 / 0.0; remaining games carry the model probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameProb {
    pub home: String,
    pub away: String,
    pub home_win_prob: f64,
}

// ============================================================================
// Market board (read-only reference data)
// ============================================================================

/// One win-total line with two-sided American odds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WinTotalLine {
    /// Half-integer win total (e.g. 9.5).
    pub total: f64,
    pub over: i32,
    pub under: i32,
}

/// All win-total lines the book offers for one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMarket {
    pub team_id: String,
    pub team_name: String,
    pub markets: Vec<WinTotalLine>,
}

// ============================================================================
// Projection output
// ============================================================================

/// Exact and cumulative win-count distribution for one team over the
/// remaining horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamProjection {
    pub team_id: String,
    pub division: String,
    pub current_wins: u32,
    /// Per-game win probabilities, in schedule order, padded to the horizon.
    pub probs: Vec<f64>,
    /// P(exactly k additional wins), k = 0..=horizon.
    pub exact: Vec<f64>,
    /// P(at least k additional wins), k = 0..=horizon.
    pub cumulative: Vec<f64>,
    pub expected_additional_wins: f64,
    pub projected_wins: f64,
}

impl TeamProjection {
    /// Remaining-game horizon (number of games modeled).
    pub fn horizon(&self) -> usize {
        self.probs.len()
    }
}

// ============================================================================
// Schedule strength output
// ============================================================================

/// Per-team schedule-strength metrics from the fixed-point solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthMetrics {
    pub team_id: String,
    /// Total games counted for this team.
    pub games: u32,
    pub observed_wins: f64,
    pub observed_win_pct: f64,
    /// Schedule-adjusted win percentage (the "true strength" estimate).
    pub neutral_win_pct: f64,
    pub neutral_wins: f64,
    /// observed_win_pct - neutral_win_pct. Positive means the schedule
    /// flattered the record.
    pub schedule_luck_win_pct: f64,
    pub schedule_luck_wins: f64,
    /// Average opponent strength from the final solver iterate.
    pub difficulty: f64,
    /// Average opponent win total excluding games against this team.
    pub opp_avg_wins_vs_others: f64,
    pub opp_avg_win_pct_vs_others: f64,
}

/// Full solver result: per-team metrics plus convergence diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleStrengthReport {
    pub teams: FxHashMap<String, StrengthMetrics>,
    /// League-wide average of the excluded-opponent win total, for context.
    pub league_avg_opp_wins_vs_others: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// Tunables for the strength solver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Damping constant: how strongly schedule difficulty moves a team's
    /// estimated strength.
    pub k: f64,
    /// Hard iteration cap; exhaustion returns the last iterate.
    pub max_iter: usize,
    /// Convergence tolerance on the max per-team strength change.
    pub tol: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            k: 1.0,
            max_iter: 200,
            tol: 1e-6,
        }
    }
}

// ============================================================================
// Market edge output
// ============================================================================

/// Stake sizing parameters for EV and Kelly figures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BetParams {
    /// Fixed stake the EV figures assume (net profit, stake excluded).
    pub stake: f64,
    pub bankroll: f64,
    /// Fraction of full Kelly to recommend (0-1).
    pub kelly_fraction: f64,
}

impl Default for BetParams {
    fn default() -> Self {
        Self {
            stake: 100.0,
            bankroll: 1000.0,
            kelly_fraction: 0.25,
        }
    }
}

/// Model-vs-book comparison for one side of a win-total line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SideEdge {
    pub american_odds: i32,
    pub book_prob: f64,
    pub model_prob: f64,
    /// model_prob - book_prob; positive means the model is more optimistic
    /// than the market.
    pub edge: f64,
    /// Net expected profit on the fixed stake.
    pub ev_on_stake: f64,
    /// Recommended fractional-Kelly stake; 0 when the edge is non-positive.
    pub kelly_stake: f64,
}

/// Edge analysis for one candidate win-total line of one team. `over` and
/// `under` are absent when the book offers no market at that total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRow {
    pub team_id: String,
    /// Half-integer win total the row refers to.
    pub line: f64,
    pub over: Option<SideEdge>,
    pub under: Option<SideEdge>,
}

// ============================================================================
// Pipeline boundary types
// ============================================================================

/// Immutable input snapshot for a full recomputation. Replaces the ambient
/// shared state of older iterations of this tool: callers build one of these
/// and receive a fresh [`AnalysisOutput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub schedule: Vec<GameFixture>,
    pub teams: Vec<TeamRecord>,
    /// User point-spreads keyed by game id; absence means "no pick".
    pub spreads: FxHashMap<u32, f64>,
    /// Completed games with real scores, solver input only.
    #[serde(default)]
    pub completed: Vec<CompletedGame>,
    /// Remaining games per team. Probability lists shorter than this are
    /// padded with coin-flips.
    pub horizon: usize,
}

/// Everything the engine derives from one input snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub computed_at: DateTime<Utc>,
    /// Projections for teams with at least one picked game, in team order.
    pub projections: Vec<TeamProjection>,
    pub strength: ScheduleStrengthReport,
    /// Edge rows for every projected team, in team order.
    pub edges: Vec<EdgeRow>,
}
