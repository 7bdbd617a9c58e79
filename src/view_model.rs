use crate::state::{HandHistoryEntry, LeaderboardEntry, PlayerStatistics, StatsState};

/// Render-ready projection of a [`StatsState`] snapshot.
///
/// Everything here is recomputed from the snapshot it was derived from;
/// presentation code reads this instead of the raw state.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsViewModel {
    pub revision: u64,
    pub player_stats: Option<PlayerStatistics>,
    pub win_rate_formatted: String,
    pub profit_loss: f64,
    pub hands_played: u64,
    pub win_percentage: String,
    pub avg_pot_won: f64,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub top_three: Vec<LeaderboardEntry>,
    pub player_rank: Option<u32>,
    pub hand_history: Vec<HandHistoryEntry>,
    pub selected_hand: Option<HandHistoryEntry>,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl StatisticsViewModel {
    pub fn derive(state: &StatsState, revision: u64) -> Self {
        let stats = state.player_stats();
        Self {
            revision,
            player_stats: stats.cloned(),
            win_rate_formatted: win_rate_formatted(stats),
            profit_loss: profit_loss(stats),
            hands_played: stats.map(|s| s.total_hands).unwrap_or(0),
            win_percentage: win_percentage(stats),
            avg_pot_won: avg_pot_won(stats),
            leaderboard: state.leaderboard.clone(),
            top_three: top_three(&state.leaderboard).to_vec(),
            player_rank: player_rank(stats, &state.leaderboard),
            hand_history: state.hand_history.clone(),
            selected_hand: state.selected_hand.clone(),
            current_page: state.current_page,
            total_pages: state.total_pages,
            page_size: state.page_size,
            has_next_page: state.has_next_page(),
            has_prev_page: state.has_prev_page(),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }
}

pub fn win_rate_formatted(stats: Option<&PlayerStatistics>) -> String {
    match stats {
        Some(s) => format!("{:.2} BB/100", s.win_rate),
        None => "N/A".to_string(),
    }
}

pub fn profit_loss(stats: Option<&PlayerStatistics>) -> f64 {
    stats
        .map(|s| s.total_winnings - s.total_losses)
        .unwrap_or(0.0)
}

pub fn win_percentage(stats: Option<&PlayerStatistics>) -> String {
    match stats {
        Some(s) if s.total_hands > 0 => {
            // Half-up to one decimal; `{:.1}` alone would round ties to even.
            let pct = (s.hands_won as f64 * 1000.0 / s.total_hands as f64).round() / 10.0;
            format!("{pct:.1}%")
        }
        _ => "0%".to_string(),
    }
}

pub fn avg_pot_won(stats: Option<&PlayerStatistics>) -> f64 {
    match stats {
        Some(s) if s.hands_won > 0 => round_half_up(s.total_winnings / s.hands_won as f64),
        _ => 0.0,
    }
}

// Ties go towards positive infinity, also for negative values.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn top_three(leaderboard: &[LeaderboardEntry]) -> &[LeaderboardEntry] {
    &leaderboard[..leaderboard.len().min(3)]
}

// Leaderboards are short, a scan is fine.
pub fn player_rank(
    stats: Option<&PlayerStatistics>,
    leaderboard: &[LeaderboardEntry],
) -> Option<u32> {
    let stats = stats?;
    leaderboard
        .iter()
        .find(|entry| entry.player_id == stats.player_id)
        .map(|entry| entry.rank)
}
