use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::config::StoreConfig;
use crate::effects::{EffectCoordinator, Intent};
use crate::fetch::{DataFetch, HttpFetcher};
use crate::http_client::http_client;
use crate::state::{DEFAULT_PAGE_SIZE, Delta, StatsState, apply_delta};
use crate::view_model::StatisticsViewModel;

const POLL_SLICE: Duration = Duration::from_millis(10);

/// Owns one dashboard session's statistics.
///
/// Completions from fetch jobs queue up on a channel and are only applied
/// on the owning thread, by [`StatsStore::pump`] and friends. Each public
/// call recomputes the view model at most once, however many writes it
/// applied.
pub struct StatsStore {
    state: Arc<StatsState>,
    view: Arc<StatisticsViewModel>,
    revision: u64,
    dirty: bool,
    page_size: u32,
    coordinator: EffectCoordinator,
    rx: Receiver<Delta>,
    subscribers: Vec<Sender<Arc<StatisticsViewModel>>>,
}

impl StatsStore {
    pub fn new(config: &StoreConfig, fetcher: Arc<dyn DataFetch>) -> Self {
        let (tx, rx) = mpsc::channel();
        let coordinator = EffectCoordinator::new(
            fetcher,
            tx,
            config.fetch_parallelism,
            config.leaderboard_limit,
        );
        let state = Arc::new(StatsState::new());
        let view = Arc::new(StatisticsViewModel::derive(&state, 0));
        let mut store = Self {
            state,
            view,
            revision: 0,
            dirty: false,
            page_size: config.page_size.max(1),
            coordinator,
            rx,
            subscribers: Vec::new(),
        };
        store.apply_configured_page_size();
        store.flush();
        store
    }

    /// Store backed by the real HTTP API at `config.base_url`.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let client = http_client(config.request_timeout)?;
        let fetcher = HttpFetcher::new(client, config.base_url.clone());
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    pub fn dispatch(&mut self, intent: Intent) {
        if intent == Intent::Reset {
            self.reset();
            return;
        }
        // Intents read pagination, so completions already queued land first.
        self.drain();
        let deltas = self.coordinator.run(intent, &self.state);
        for delta in deltas {
            self.apply(delta);
        }
        self.flush();
    }

    /// Applies every completion that has arrived so far. Returns how many.
    pub fn pump(&mut self) -> usize {
        let applied = self.drain();
        self.flush();
        applied
    }

    /// Pumps until no fetch is in flight. Returns `false` on timeout.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        self.pump_while(timeout, |store| store.coordinator.inflight() > 0)
    }

    /// Pumps until `pred` holds for the current snapshot. Returns `false` on
    /// timeout.
    pub fn pump_until(&mut self, timeout: Duration, pred: impl Fn(&StatsState) -> bool) -> bool {
        self.pump_while(timeout, |store| !pred(store.state.as_ref()))
    }

    pub fn reset(&mut self) {
        self.apply(Delta::Reset);
        self.apply_configured_page_size();
        self.flush();
    }

    /// Tears the session down. Completions still in flight are dropped.
    pub fn discard(self) {
        debug!(inflight = self.coordinator.inflight(), "discarding stats store");
    }

    pub fn snapshot(&self) -> Arc<StatsState> {
        self.state.clone()
    }

    pub fn view_model(&self) -> Arc<StatisticsViewModel> {
        self.view.clone()
    }

    /// The receiver gets the current view model right away, then one per
    /// recomputation. Every subscriber gets the same `Arc`.
    pub fn subscribe(&mut self) -> Receiver<Arc<StatisticsViewModel>> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.view.clone());
        self.subscribers.push(tx);
        rx
    }

    pub fn inflight(&self) -> usize {
        self.coordinator.inflight()
    }

    pub fn logs(&self) -> &VecDeque<String> {
        &self.state.logs
    }

    fn pump_while(&mut self, timeout: Duration, busy: impl Fn(&Self) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.drain();
            if !busy(self) {
                // A job may have sent right before dropping its inflight count.
                self.drain();
                self.flush();
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                self.flush();
                return false;
            }
            match self.rx.recv_timeout(POLL_SLICE.min(deadline - now)) {
                Ok(delta) => self.apply(delta),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.flush();
                    return !busy(self);
                }
            }
        }
    }

    fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(delta) = self.rx.try_recv() {
            self.apply(delta);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, delta: Delta) {
        let prev = Arc::unwrap_or_clone(std::mem::take(&mut self.state));
        self.state = Arc::new(apply_delta(prev, delta));
        self.dirty = true;
    }

    fn apply_configured_page_size(&mut self) {
        if self.page_size != DEFAULT_PAGE_SIZE {
            self.apply(Delta::SetPageSize(self.page_size));
        }
    }

    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        self.revision += 1;
        self.view = Arc::new(StatisticsViewModel::derive(&self.state, self.revision));
        let view = self.view.clone();
        self.subscribers.retain(|sub| sub.send(view.clone()).is_ok());
    }
}
