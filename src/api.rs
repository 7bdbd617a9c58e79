use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::fetch::{DataFetch, HttpError};
use crate::state::{HandHistoryEntry, HandHistoryPage, LeaderboardEntry, PlayerStatistics};

pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

pub fn player_stats_path(player_id: &str) -> String {
    format!("/statistics/player/{player_id}")
}

pub fn hand_history_path(player_id: &str) -> String {
    format!("/hand-history/player/{player_id}")
}

pub fn hand_details_path(hand_id: &str) -> String {
    format!("/hand-history/{hand_id}")
}

pub const ALL_PLAYERS_PATH: &str = "/statistics/all";
pub const LEADERBOARD_PATH: &str = "/statistics/leaderboard";

pub fn fetch_player_stats(
    fetcher: &dyn DataFetch,
    player_id: &str,
) -> Result<PlayerStatistics, HttpError> {
    let body = fetcher.fetch(&player_stats_path(player_id), &[])?;
    parse_player_stats(body)
}

pub fn fetch_all_players_stats(fetcher: &dyn DataFetch) -> Result<Vec<PlayerStatistics>, HttpError> {
    let body = fetcher.fetch(ALL_PLAYERS_PATH, &[])?;
    parse_list(body)
}

pub fn fetch_leaderboard(
    fetcher: &dyn DataFetch,
    limit: u32,
) -> Result<Vec<LeaderboardEntry>, HttpError> {
    let body = fetcher.fetch(LEADERBOARD_PATH, &[("limit", limit.to_string())])?;
    parse_list(body)
}

pub fn fetch_hand_history_page(
    fetcher: &dyn DataFetch,
    player_id: &str,
    page: u32,
    size: u32,
) -> Result<HandHistoryPage, HttpError> {
    let body = fetcher.fetch(
        &hand_history_path(player_id),
        &[("page", page.to_string()), ("size", size.to_string())],
    )?;
    parse_hand_history_page(body)
}

pub fn fetch_hand_details(
    fetcher: &dyn DataFetch,
    hand_id: &str,
) -> Result<HandHistoryEntry, HttpError> {
    let body = fetcher.fetch(&hand_details_path(hand_id), &[])?;
    parse_hand_entry(body)
}

pub fn parse_player_stats(body: Value) -> Result<PlayerStatistics, HttpError> {
    if body.is_null() {
        return Err(HttpError::Unknown("empty player statistics body".to_string()));
    }
    Ok(serde_json::from_value(body)?)
}

pub fn parse_hand_entry(body: Value) -> Result<HandHistoryEntry, HttpError> {
    if body.is_null() {
        return Err(HttpError::Unknown("empty hand history body".to_string()));
    }
    let entry: HandHistoryEntry = serde_json::from_value(body)?;
    if entry.community_cards.len() > 5 {
        return Err(HttpError::Unknown(format!(
            "hand {} has {} community cards",
            entry.id,
            entry.community_cards.len()
        )));
    }
    Ok(entry)
}

pub fn parse_hand_history_page(body: Value) -> Result<HandHistoryPage, HttpError> {
    if body.is_null() {
        return Ok(HandHistoryPage {
            content: Vec::new(),
            total_pages: 0,
            number: 0,
        });
    }
    Ok(serde_json::from_value(body)?)
}

// `null` is treated like an empty array.
pub fn parse_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, HttpError> {
    if body.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(body)?)
}
