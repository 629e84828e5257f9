//! The match description block embedded in replay file headers.

/// Size in bytes of one serialized team record.
///
/// Team records are produced and consumed by the team-management side
/// of the simulation; the replay subsystem stores them verbatim so a
/// saved file can rebuild the kits, names and tactics it was recorded
/// with.
pub const TEAM_BLOCK_LEN: usize = 684;

/// Length of the game name and game round fields, in bytes.
pub const LABEL_LEN: usize = 24;

/// Everything about the match that lives in the file header rather
/// than the recorded payload: the two team records, competition
/// labels, final score and pitch selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchInfo {
    /// Serialized home team record.
    pub team1: [u8; TEAM_BLOCK_LEN],
    /// Serialized away team record.
    pub team2: [u8; TEAM_BLOCK_LEN],
    /// Competition name, zero-padded.
    pub game_name: [u8; LABEL_LEN],
    /// Round within the competition, zero-padded.
    pub game_round: [u8; LABEL_LEN],
    /// Home team goals at the time of saving.
    pub team1_goals: u8,
    /// Away team goals at the time of saving.
    pub team2_goals: u8,
    /// Pitch surface type.
    pub pitch_type: u8,
    /// Pitch graphics variant.
    pub pitch_number: u8,
    /// Substitutions allowed per team in this match.
    pub max_substitutes: u8,
}

impl Default for MatchInfo {
    fn default() -> Self {
        Self {
            team1: [0; TEAM_BLOCK_LEN],
            team2: [0; TEAM_BLOCK_LEN],
            game_name: [0; LABEL_LEN],
            game_round: [0; LABEL_LEN],
            team1_goals: 0,
            team2_goals: 0,
            pitch_type: 0,
            pitch_number: 0,
            max_substitutes: 0,
        }
    }
}
