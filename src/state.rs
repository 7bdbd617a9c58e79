use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_LOGS: usize = 200;

/// Cumulative statistics for a single player, as served by
/// `GET /statistics/player/{playerId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    #[serde(deserialize_with = "de_id")]
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub total_games: u64,
    #[serde(default)]
    pub total_hands: u64,
    #[serde(default)]
    pub hands_won: u64,
    #[serde(default)]
    pub hands_lost: u64,
    #[serde(default)]
    pub total_winnings: f64,
    #[serde(default)]
    pub total_losses: f64,
    #[serde(default)]
    pub biggest_pot_won: f64,

    // Behavioural rates, already normalised by the server.
    #[serde(default)]
    pub vpip: f64,
    #[serde(default)]
    pub pfr: f64,
    #[serde(default)]
    pub aggression: f64,
    #[serde(default)]
    pub win_rate: f64,
    #[serde(default)]
    pub showdown_win_rate: f64,

    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    #[serde(deserialize_with = "de_id")]
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub total_winnings: f64,
    #[serde(default)]
    pub hands_won: u64,
    #[serde(default)]
    pub win_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
    SmallBlind,
    BigBlind,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandHistoryPlayer {
    #[serde(deserialize_with = "de_id")]
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub seat_position: u32,
    #[serde(default)]
    pub starting_chips: f64,
    #[serde(default)]
    pub ending_chips: f64,
    // Only present when the cards were shown down.
    #[serde(default)]
    pub hole_cards: Option<Vec<String>>,
}

impl HandHistoryPlayer {
    pub fn chip_delta(&self) -> f64 {
        self.ending_chips - self.starting_chips
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandHistoryAction {
    pub phase: GamePhase,
    #[serde(deserialize_with = "de_id")]
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    pub action_type: ActionType,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandHistoryEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub hand_number: u64,
    #[serde(default)]
    pub players: Vec<HandHistoryPlayer>,
    #[serde(default)]
    pub community_cards: Vec<String>,
    #[serde(default)]
    pub pot_size: f64,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub winner_id: Option<String>,
    #[serde(default)]
    pub winner_name: Option<String>,
    #[serde(default)]
    pub winning_hand: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub actions: Vec<HandHistoryAction>,
}

impl HandHistoryEntry {
    /// Chips won (positive) or lost (negative) by `player_id` in this hand.
    pub fn net_result_for(&self, player_id: &str) -> Option<f64> {
        self.players
            .iter()
            .find(|p| p.player_id == player_id)
            .map(HandHistoryPlayer::chip_delta)
    }

    pub fn actions_in(&self, phase: GamePhase) -> impl Iterator<Item = &HandHistoryAction> {
        self.actions.iter().filter(move |a| a.phase == phase)
    }

    /// Last street the board reached, judged by the community cards dealt.
    pub fn street(&self) -> GamePhase {
        match self.community_cards.len() {
            0..=2 => GamePhase::PreFlop,
            3 => GamePhase::Flop,
            4 => GamePhase::Turn,
            _ => GamePhase::River,
        }
    }
}

/// One page of `GET /hand-history/player/{playerId}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandHistoryPage {
    #[serde(default)]
    pub content: Vec<HandHistoryEntry>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsState {
    pub player_stats: Option<PlayerStatistics>,
    pub all_players_stats: HashMap<String, PlayerStatistics>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub hand_history: Vec<HandHistoryEntry>,
    pub selected_hand: Option<HandHistoryEntry>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub logs: VecDeque<String>,
}

impl Default for StatsState {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsState {
    pub fn new() -> Self {
        Self {
            player_stats: None,
            all_players_stats: HashMap::new(),
            leaderboard: Vec::new(),
            hand_history: Vec::new(),
            selected_hand: None,
            is_loading: false,
            error: None,
            current_page: 0,
            total_pages: 0,
            page_size: DEFAULT_PAGE_SIZE,
            logs: VecDeque::with_capacity(MAX_LOGS),
        }
    }

    pub fn player_stats(&self) -> Option<&PlayerStatistics> {
        self.player_stats.as_ref()
    }

    pub fn all_players_stats(&self) -> &HashMap<String, PlayerStatistics> {
        &self.all_players_stats
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn hand_history(&self) -> &[HandHistoryEntry] {
        &self.hand_history
    }

    pub fn selected_hand(&self) -> Option<&HandHistoryEntry> {
        self.selected_hand.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            current_page: self.current_page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page.saturating_add(1) < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 0
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

/// Every write to [`StatsState`] goes through one of these.
#[derive(Debug, Clone)]
pub enum Delta {
    SetPlayerStats(PlayerStatistics),
    SetAllPlayersStats(Vec<PlayerStatistics>),
    SetLeaderboard(Vec<LeaderboardEntry>),
    SetHandHistory(Vec<HandHistoryEntry>),
    AppendHandHistory(Vec<HandHistoryEntry>),
    SetSelectedHand(Option<HandHistoryEntry>),
    SetLoading(bool),
    SetError(String),
    SetPagination { current_page: u32, total_pages: u32 },
    SetPageSize(u32),
    Reset,
    // Applied in order as one write, so no reader sees half of a completion.
    Batch(Vec<Delta>),
    Log(String),
}

/// Consumes the previous snapshot and returns the next one.
pub fn apply_delta(mut state: StatsState, delta: Delta) -> StatsState {
    match delta {
        Delta::SetPlayerStats(stats) => {
            state.player_stats = Some(stats);
            state.error = None;
        }
        Delta::SetAllPlayersStats(players) => {
            state.all_players_stats = players
                .into_iter()
                .map(|p| (p.player_id.clone(), p))
                .collect();
            state.error = None;
        }
        Delta::SetLeaderboard(entries) => {
            state.leaderboard = entries;
            state.error = None;
        }
        Delta::SetHandHistory(entries) => {
            state.hand_history = entries;
            state.error = None;
        }
        Delta::AppendHandHistory(entries) => {
            state.hand_history.extend(entries);
            state.error = None;
        }
        Delta::SetSelectedHand(hand) => {
            state.selected_hand = hand;
            state.error = None;
        }
        Delta::SetLoading(loading) => {
            state.is_loading = loading;
        }
        Delta::SetError(message) => {
            state.error = Some(message);
            state.is_loading = false;
        }
        Delta::SetPagination {
            current_page,
            total_pages,
        } => {
            if total_pages == 0 {
                state.current_page = 0;
                state.total_pages = 0;
            } else {
                state.current_page = current_page.min(total_pages - 1);
                state.total_pages = total_pages;
            }
        }
        Delta::SetPageSize(size) => {
            state.page_size = size.max(1);
        }
        Delta::Reset => {
            state = StatsState::new();
        }
        Delta::Batch(deltas) => {
            for delta in deltas {
                state = apply_delta(state, delta);
            }
        }
        Delta::Log(line) => {
            state.push_log(line);
        }
    }
    state
}

// Backends disagree on whether ids are JSON numbers or strings.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
        Uint(u64),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Str(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    })
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "de_id")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

// Timestamps are informational: an unreadable one becomes `None` instead of
// failing the whole record. Offsets are normalised to UTC.
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_timestamp(&Value::deserialize(deserializer)?))
}

pub fn parse_timestamp(raw: &Value) -> Option<NaiveDateTime> {
    match raw {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.naive_utc())
                .ok()
                .or_else(|| s.parse::<NaiveDateTime>().ok())
        }
        // Jackson without JavaTimeModule config: [y, m, d, h, min, s?, nanos?]
        Value::Array(parts) => {
            let mut nums = parts.iter().map(Value::as_u64);
            let mut next = || nums.next().flatten().and_then(|n| u32::try_from(n).ok());
            let year = i32::try_from(next()?).ok()?;
            let (month, day) = (next()?, next()?);
            let hour = next().unwrap_or(0);
            let minute = next().unwrap_or(0);
            let second = next().unwrap_or(0);
            let nanos = next().unwrap_or(0);
            NaiveDate::from_ymd_opt(year, month, day)?.and_hms_nano_opt(hour, minute, second, nanos)
        }
        _ => None,
    }
}
