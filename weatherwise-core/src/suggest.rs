//! Debounced place suggestions for a single search field.
//!
//! Every keystroke bumps a generation counter. The debounce timer and the
//! lookup it triggers both carry the generation they were started with, and a
//! result is applied only while that generation is still current.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    config::SearchConfig,
    error::{EMPTY_LOCATION_MESSAGE, WeatherError},
    place::{PlaceReader, PlaceWriter},
    provider::PlaceLookup,
};

/// Inline message shown when the lookup request fails.
pub const SUGGESTION_ERROR_MESSAGE: &str = "Unable to fetch suggestions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Empty field or text below the minimum query length.
    Idle,
    /// Waiting for typing to settle.
    Debouncing,
    Querying,
    Suggested,
    Failed,
    /// Lookup succeeded with zero matches.
    Empty,
}

/// Everything a search field and its dropdown render from.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub text: String,
    pub phase: SearchPhase,
    pub suggestions: Vec<String>,
    pub visible: bool,
    pub error: Option<String>,
    /// A submit is waiting out its simulated latency.
    pub committing: bool,
    generation: u64,
}

impl SearchState {
    fn new() -> Self {
        Self {
            text: String::new(),
            phase: SearchPhase::Idle,
            suggestions: Vec::new(),
            visible: false,
            error: None,
            committing: false,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The dropdown is open for visible suggestions or for an error line.
    pub fn shows_dropdown(&self) -> bool {
        (self.visible && !self.suggestions.is_empty()) || self.error.is_some()
    }

    fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.visible = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_len: usize,
    pub submit_delay: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            submit_delay: config.submit_delay(),
        }
    }
}

/// Cheap to clone; clones drive the same field.
#[derive(Debug, Clone)]
pub struct SuggestionFetcher {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    lookup: Arc<dyn PlaceLookup>,
    settings: SearchSettings,
    state: watch::Sender<SearchState>,
    timer: Mutex<Option<JoinHandle<()>>>,
    place: PlaceWriter,
    runtime: Handle,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SuggestionFetcher {
    /// Takes ownership of the place writer: this field is the only thing
    /// that commits places.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new(lookup: Arc<dyn PlaceLookup>, settings: SearchSettings, place: PlaceWriter) -> Self {
        let (state, _) = watch::channel(SearchState::new());
        Self {
            inner: Arc::new(Inner {
                lookup,
                settings,
                state,
                timer: Mutex::new(None),
                place,
                runtime: Handle::current(),
            }),
        }
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// A reader for the place this field commits.
    pub fn place(&self) -> PlaceReader {
        self.inner.place.subscribe()
    }

    /// Handle a change of the field's text.
    pub fn on_input(&self, text: &str) {
        let mut timer = lock(&self.inner.timer);
        cancel_timer(&mut timer);

        let min_len = self.inner.settings.min_query_len;
        let too_short = text.chars().count() < min_len;
        let mut generation = 0;

        self.inner.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.text = text.to_string();
            if too_short {
                s.phase = SearchPhase::Idle;
                s.hide_suggestions();
            } else {
                s.phase = SearchPhase::Debouncing;
            }
        });

        if too_short {
            debug!(generation, "Query too short, suggestions cleared");
            return;
        }

        let query = text.to_string();
        let debounce = self.inner.settings.debounce;
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);

        *timer = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Some(inner) = weak.upgrade() {
                inner.begin_query(generation, query);
            }
        }));
    }

    /// Pick a suggestion: it becomes both the field text and the committed place.
    pub fn select(&self, name: &str) {
        self.settle_text(name);
        self.inner.place.commit(name);
    }

    /// Replace the field text without looking it up, e.g. before a submit.
    pub fn set_text(&self, text: &str) {
        self.settle_text(text);
    }

    /// Cancel the timer and outdate any lookup in flight, closing the dropdown.
    fn settle_text(&self, text: &str) {
        let mut timer = lock(&self.inner.timer);
        cancel_timer(&mut timer);

        self.inner.state.send_modify(|s| {
            s.generation += 1;
            s.text = text.to_string();
            s.phase = SearchPhase::Idle;
            s.visible = false;
        });
    }

    /// Close the dropdown, e.g. on a click outside it.
    pub fn dismiss(&self) {
        self.inner.state.send_if_modified(|s| {
            let was_visible = s.visible;
            s.visible = false;
            was_visible
        });
    }

    /// Commit the field text as the selected place after the simulated latency.
    ///
    /// Pending lookups are outdated first, so the list stays closed afterwards.
    pub async fn submit(&self) -> Result<Arc<str>, WeatherError> {
        let text = self.inner.state.borrow().text.trim().to_string();

        if text.is_empty() {
            self.inner.state.send_modify(|s| {
                s.error = Some(EMPTY_LOCATION_MESSAGE.to_string());
                s.committing = false;
            });
            return Err(WeatherError::empty_location());
        }

        self.settle_text(&text);
        self.inner.state.send_modify(|s| {
            s.error = None;
            s.committing = true;
        });

        tokio::time::sleep(self.inner.settings.submit_delay).await;

        let place: Arc<str> = text.into();
        self.inner.place.commit(Arc::clone(&place));
        self.inner.state.send_modify(|s| {
            s.committing = false;
            s.visible = false;
        });

        Ok(place)
    }
}

fn cancel_timer(slot: &mut Option<JoinHandle<()>>) {
    if let Some(pending) = slot.take() {
        pending.abort();
    }
}

impl Inner {
    fn begin_query(self: Arc<Self>, generation: u64, query: String) {
        let started = self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            s.phase = SearchPhase::Querying;
            true
        });
        if !started {
            return;
        }

        debug!(generation, query = %query, "Looking up places");
        let runtime = self.runtime.clone();
        runtime.spawn(async move {
            let result = self.lookup.lookup(&query).await;
            self.apply(generation, result);
        });
    }

    fn apply(&self, generation: u64, result: Result<Vec<String>, WeatherError>) {
        let applied = self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            match result {
                Ok(names) if names.is_empty() => {
                    s.phase = SearchPhase::Empty;
                    s.hide_suggestions();
                    s.error = None;
                }
                Ok(names) => {
                    s.phase = SearchPhase::Suggested;
                    s.suggestions = names;
                    s.visible = true;
                    s.error = None;
                }
                Err(e) => {
                    warn!(error = %e, "Place lookup failed");
                    s.phase = SearchPhase::Failed;
                    s.hide_suggestions();
                    s.error = Some(SUGGESTION_ERROR_MESSAGE.to_string());
                }
            }
            true
        });

        if !applied {
            debug!(generation, "Discarding superseded lookup result");
        }
    }
}
