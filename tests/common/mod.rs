#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use holdem_stats::{DataFetch, HttpError, StatsStore, StoreConfig};

pub const WAIT: Duration = Duration::from_secs(5);

struct Route {
    result: Result<Value, HttpError>,
    gate: Option<Receiver<()>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted responses per path, served in the order they were queued.
/// Unscripted paths answer 404.
#[derive(Default)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, VecDeque<Route>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, result: Result<Value, HttpError>) {
        self.push(path, Route { result, gate: None });
    }

    /// The fetch blocks until the returned sender fires (or is dropped).
    pub fn respond_gated(&self, path: &str, result: Result<Value, HttpError>) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.push(
            path,
            Route {
                result,
                gate: Some(rx),
            },
        );
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    fn push(&self, path: &str, route: Route) {
        self.routes
            .lock()
            .expect("routes lock poisoned")
            .entry(path.to_string())
            .or_default()
            .push_back(route);
    }
}

impl DataFetch for MockFetcher {
    fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, HttpError> {
        self.calls.lock().expect("calls lock poisoned").push(Call {
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
        let route = self
            .routes
            .lock()
            .expect("routes lock poisoned")
            .get_mut(path)
            .and_then(VecDeque::pop_front);
        let Some(route) = route else {
            return Err(HttpError::status(404, "Not Found"));
        };
        if let Some(gate) = route.gate {
            let _ = gate.recv();
        }
        route.result
    }
}

pub fn test_config() -> StoreConfig {
    StoreConfig {
        fetch_parallelism: 8,
        ..StoreConfig::default()
    }
}

pub fn store_with(mock: &Arc<MockFetcher>) -> StatsStore {
    let fetcher: Arc<dyn DataFetch> = mock.clone();
    StatsStore::new(&test_config(), fetcher)
}

pub fn player_json(player_id: &str, total_hands: u64, hands_won: u64) -> Value {
    json!({
        "playerId": player_id,
        "playerName": format!("Player {player_id}"),
        "totalGames": 12,
        "totalHands": total_hands,
        "handsWon": hands_won,
        "handsLost": total_hands.saturating_sub(hands_won),
        "totalWinnings": 5000.0,
        "totalLosses": 3200.0,
        "biggestPotWon": 900.0,
        "vpip": 24.5,
        "pfr": 18.0,
        "aggression": 2.1,
        "winRate": 7.456,
        "showdownWinRate": 52.0,
        "createdAt": "2024-03-01T10:00:00",
        "updatedAt": "2024-03-02T11:30:00"
    })
}

pub fn leaderboard_json(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .enumerate()
            .map(|(idx, id)| {
                json!({
                    "rank": idx + 1,
                    "playerId": id,
                    "playerName": format!("Player {id}"),
                    "totalWinnings": 10_000.0 - idx as f64 * 1000.0,
                    "handsWon": 100 - idx,
                    "winRate": 12.5
                })
            })
            .collect(),
    )
}

pub fn hand_json(id: u64) -> Value {
    json!({
        "id": id,
        "handNumber": id,
        "players": [
            {
                "playerId": "p1",
                "playerName": "Alice",
                "seatPosition": 0,
                "startingChips": 1000.0,
                "endingChips": 1150.0,
                "holeCards": ["AH", "KH"]
            },
            {
                "playerId": "p2",
                "playerName": "Bob",
                "seatPosition": 1,
                "startingChips": 1000.0,
                "endingChips": 850.0
            }
        ],
        "communityCards": ["2C", "7D", "9H"],
        "potSize": 300.0,
        "winnerId": "p1",
        "winnerName": "Alice",
        "winningHand": "High card",
        "timestamp": "2024-03-01T10:05:00",
        "actions": [
            {
                "phase": "PRE_FLOP",
                "playerId": "p1",
                "playerName": "Alice",
                "actionType": "RAISE",
                "amount": 60.0,
                "timestamp": "2024-03-01T10:04:10"
            },
            {
                "phase": "PRE_FLOP",
                "playerId": "p2",
                "playerName": "Bob",
                "actionType": "CALL",
                "amount": 60.0,
                "timestamp": "2024-03-01T10:04:20"
            },
            {
                "phase": "FLOP",
                "playerId": "p2",
                "playerName": "Bob",
                "actionType": "CHECK",
                "timestamp": "2024-03-01T10:04:40"
            }
        ]
    })
}

pub fn page_json(ids: &[u64], number: u32, total_pages: u32) -> Value {
    json!({
        "content": ids.iter().map(|id| hand_json(*id)).collect::<Vec<_>>(),
        "totalPages": total_pages,
        "number": number
    })
}

pub fn history_ids(store: &StatsStore) -> Vec<String> {
    store
        .snapshot()
        .hand_history
        .iter()
        .map(|h| h.id.clone())
        .collect()
}
