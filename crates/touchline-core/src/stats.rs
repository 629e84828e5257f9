//! Per-team match statistics.

/// Running statistics for one team, updated by the simulation as the
/// match progresses.
///
/// Counters are `u16` because they are packed two per 32-bit word when
/// recorded into a replay; no counter can plausibly exceed that range
/// in a single match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TeamStats {
    /// Ball possession, in percent.
    pub ball_possession: u16,
    /// Total goal attempts.
    pub goal_attempts: u16,
    /// Goal attempts on target.
    pub on_target: u16,
    /// Corners won.
    pub corners_won: u16,
    /// Fouls conceded.
    pub fouls_conceded: u16,
    /// Yellow cards shown.
    pub bookings: u16,
    /// Red cards shown.
    pub sendings_off: u16,
}

/// Statistics for both teams at one point in the match.
///
/// # Examples
///
/// ```
/// use touchline_core::{MatchStats, TeamStats};
///
/// let stats = MatchStats {
///     team1: TeamStats { ball_possession: 61, ..Default::default() },
///     team2: TeamStats { ball_possession: 39, ..Default::default() },
/// };
///
/// assert_eq!(stats.team1.ball_possession + stats.team2.ball_possession, 100);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// Statistics for the home team.
    pub team1: TeamStats,
    /// Statistics for the away team.
    pub team2: TeamStats,
}
