use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, warn};

use crate::api::{self, DEFAULT_LEADERBOARD_LIMIT};
use crate::fetch::{DataFetch, HttpError};
use crate::state::{Delta, StatsState};

/// External requests the store knows how to satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    LoadPlayerStats { player_id: String },
    LoadAllPlayersStats,
    LoadLeaderboard { limit: Option<u32> },
    LoadHandHistory { player_id: String, page: Option<u32> },
    LoadMoreHistory { player_id: String },
    LoadHandDetails { hand_id: String },
    InitializeDashboard { player_id: String },
    ChangePageSize { page_size: u32 },
    ClearSelectedHand,
    Reset,
}

/// Turns intents into fetch jobs and reports their completions as deltas.
///
/// Jobs run on a rayon pool and never wait on each other. Nothing is
/// cancelled: whichever completion is received last wins its slot.
pub struct EffectCoordinator {
    fetcher: Arc<dyn DataFetch>,
    pool: Option<rayon::ThreadPool>,
    tx: Sender<Delta>,
    inflight: Arc<AtomicUsize>,
    leaderboard_limit: u32,
}

impl EffectCoordinator {
    pub fn new(
        fetcher: Arc<dyn DataFetch>,
        tx: Sender<Delta>,
        fetch_parallelism: usize,
        leaderboard_limit: u32,
    ) -> Self {
        Self {
            fetcher,
            pool: build_fetch_pool(fetch_parallelism),
            tx,
            inflight: Arc::new(AtomicUsize::new(0)),
            leaderboard_limit: if leaderboard_limit == 0 {
                DEFAULT_LEADERBOARD_LIMIT
            } else {
                leaderboard_limit
            },
        }
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    /// Starts whatever fetches `intent` needs and returns the writes that
    /// must land before any of them complete.
    pub fn run(&self, intent: Intent, state: &StatsState) -> Vec<Delta> {
        debug!(?intent, "dispatching intent");
        match intent {
            Intent::LoadPlayerStats { player_id } => {
                self.spawn(move |fetcher| {
                    match api::fetch_player_stats(fetcher, &player_id) {
                        Ok(stats) => {
                            Delta::Batch(vec![Delta::SetPlayerStats(stats), Delta::SetLoading(false)])
                        }
                        Err(err) => failure("Player stats", &err),
                    }
                });
                vec![Delta::SetLoading(true)]
            }
            Intent::LoadAllPlayersStats => {
                self.spawn(|fetcher| match api::fetch_all_players_stats(fetcher) {
                    Ok(players) => Delta::Batch(vec![
                        Delta::SetAllPlayersStats(players),
                        Delta::SetLoading(false),
                    ]),
                    Err(err) => failure("All players stats", &err),
                });
                vec![Delta::SetLoading(true)]
            }
            Intent::LoadLeaderboard { limit } => {
                let limit = limit.unwrap_or(self.leaderboard_limit);
                self.spawn(move |fetcher| match api::fetch_leaderboard(fetcher, limit) {
                    Ok(entries) => Delta::Batch(vec![
                        Delta::SetLeaderboard(entries),
                        Delta::SetLoading(false),
                    ]),
                    Err(err) => failure("Leaderboard", &err),
                });
                vec![Delta::SetLoading(true)]
            }
            Intent::LoadHandHistory { player_id, page } => {
                let page = page.unwrap_or(0);
                let size = state.page_size;
                self.spawn(move |fetcher| {
                    match api::fetch_hand_history_page(fetcher, &player_id, page, size) {
                        Ok(resp) => Delta::Batch(vec![
                            Delta::SetHandHistory(resp.content),
                            Delta::SetPagination {
                                current_page: resp.number,
                                total_pages: resp.total_pages,
                            },
                            Delta::SetLoading(false),
                        ]),
                        Err(err) => failure("Hand history", &err),
                    }
                });
                vec![Delta::SetLoading(true)]
            }
            Intent::LoadMoreHistory { player_id } => {
                if !state.has_next_page() {
                    debug!(
                        current_page = state.current_page,
                        total_pages = state.total_pages,
                        "no further hand history page"
                    );
                    return Vec::new();
                }
                let page = state.current_page + 1;
                let size = state.page_size;
                self.spawn(move |fetcher| {
                    match api::fetch_hand_history_page(fetcher, &player_id, page, size) {
                        Ok(resp) => Delta::Batch(vec![
                            Delta::AppendHandHistory(resp.content),
                            Delta::SetPagination {
                                current_page: resp.number,
                                total_pages: resp.total_pages,
                            },
                            Delta::SetLoading(false),
                        ]),
                        Err(err) => failure("More hand history", &err),
                    }
                });
                vec![Delta::SetLoading(true)]
            }
            Intent::LoadHandDetails { hand_id } => {
                self.spawn(move |fetcher| match api::fetch_hand_details(fetcher, &hand_id) {
                    Ok(hand) => Delta::Batch(vec![
                        Delta::SetSelectedHand(Some(hand)),
                        Delta::SetLoading(false),
                    ]),
                    Err(err) => failure("Hand details", &err),
                });
                vec![Delta::SetLoading(true)]
            }
            Intent::InitializeDashboard { player_id } => {
                // Three independent loads; each settles loading/error on its own.
                let mut out = vec![
                    Delta::SetLoading(true),
                    Delta::Log(format!("[INFO] Initializing dashboard for {player_id}")),
                ];
                out.extend(self.run(
                    Intent::LoadPlayerStats {
                        player_id: player_id.clone(),
                    },
                    state,
                ));
                out.extend(self.run(
                    Intent::LoadLeaderboard {
                        limit: Some(DEFAULT_LEADERBOARD_LIMIT),
                    },
                    state,
                ));
                out.extend(self.run(
                    Intent::LoadHandHistory {
                        player_id,
                        page: Some(0),
                    },
                    state,
                ));
                out
            }
            Intent::ChangePageSize { page_size } => vec![Delta::SetPageSize(page_size)],
            Intent::ClearSelectedHand => vec![Delta::SetSelectedHand(None)],
            Intent::Reset => vec![Delta::Reset],
        }
    }

    fn spawn(&self, job: impl FnOnce(&dyn DataFetch) -> Delta + Send + 'static) {
        self.inflight.fetch_add(1, Ordering::SeqCst);
        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        let inflight = self.inflight.clone();
        let task = move || {
            let delta = job(fetcher.as_ref());
            // The store may already be gone; then the result is dropped.
            let _ = tx.send(delta);
            inflight.fetch_sub(1, Ordering::SeqCst);
        };

        if let Some(pool) = self.pool.as_ref() {
            pool.spawn(task);
        } else {
            thread::spawn(task);
        }
    }
}

fn failure(context: &str, err: &HttpError) -> Delta {
    warn!(%err, "{context} fetch failed");
    Delta::Batch(vec![
        Delta::Log(format!("[WARN] {context} error: {err}")),
        Delta::SetError(err.user_message()),
    ])
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(2, 32))
        .thread_name(|idx| format!("stats-fetch-{idx}"))
        .build()
        .ok()
}
