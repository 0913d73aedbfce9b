use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use parking_lot::Mutex;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::{model::DriverMatch, store::FleetStore};

pub const SEARCH_LIMIT: usize = 10;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Matches(Vec<DriverMatch>),
    /// Storage failed. Callers that only want candidates see an empty list.
    Unavailable,
}

impl SearchOutcome {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SearchOutcome::Unavailable)
    }

    pub fn candidates(&self) -> &[DriverMatch] {
        match self {
            SearchOutcome::Matches(drivers) => drivers,
            SearchOutcome::Unavailable => &[],
        }
    }

    pub fn into_candidates(self) -> Vec<DriverMatch> {
        match self {
            SearchOutcome::Matches(drivers) => drivers,
            SearchOutcome::Unavailable => Vec::new(),
        }
    }
}

/// Finds active drivers by name or license number.
pub struct DriverFinder<'a, S> {
    store: &'a S,
}

impl<'a, S: FleetStore> DriverFinder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// A blank query returns no candidates without touching storage.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Matches(Vec::new());
        }

        match self.store.search_active_drivers(query, SEARCH_LIMIT).await {
            Ok(mut drivers) => {
                drivers.truncate(SEARCH_LIMIT);
                SearchOutcome::Matches(drivers)
            }
            Err(error) => {
                error!(%error, "driver search failed");
                SearchOutcome::Unavailable
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchToken(u64);

/// Issues monotonically increasing tokens; only the latest one is current.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    latest: AtomicU64,
}

impl SearchSequencer {
    pub fn issue(&self) -> SearchToken {
        SearchToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, token: SearchToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Drives the finder from keystrokes: debounced, and never lets a stale
/// response overwrite the results of a newer query.
pub struct DriverPicker<S> {
    store: S,
    debounce: Duration,
    sequencer: SearchSequencer,
    results: Mutex<SearchOutcome>,
}

impl<S: FleetStore> DriverPicker<S> {
    pub fn new(store: S) -> Self {
        Self::with_debounce(store, SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(store: S, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            sequencer: SearchSequencer::default(),
            results: Mutex::new(SearchOutcome::Matches(Vec::new())),
        }
    }

    /// Handles the search box changing to `query`.
    ///
    /// Returns `None` when the query was superseded before or while it ran.
    pub async fn input(&self, query: &str) -> Option<SearchOutcome> {
        let token = self.sequencer.issue();

        if query.trim().is_empty() {
            return Some(self.store_results(SearchOutcome::Matches(Vec::new())));
        }

        tokio::time::sleep(self.debounce).await;
        if !self.sequencer.is_latest(token) {
            debug!(query, "search superseded before it started");
            return None;
        }

        let outcome = DriverFinder::new(&self.store).search(query).await;
        if !self.sequencer.is_latest(token) {
            debug!(query, "discarding stale search response");
            return None;
        }

        Some(self.store_results(outcome))
    }

    pub fn results(&self) -> SearchOutcome {
        self.results.lock().clone()
    }

    /// Takes a driver from the current results and clears the search, which
    /// also invalidates any search still in flight.
    pub fn select(&self, driver_id: Uuid) -> Option<DriverMatch> {
        self.sequencer.issue();
        let previous = std::mem::replace(
            &mut *self.results.lock(),
            SearchOutcome::Matches(Vec::new()),
        );
        previous
            .into_candidates()
            .into_iter()
            .find(|driver| driver.id == driver_id)
    }

    fn store_results(&self, outcome: SearchOutcome) -> SearchOutcome {
        *self.results.lock() = outcome.clone();
        outcome
    }
}
