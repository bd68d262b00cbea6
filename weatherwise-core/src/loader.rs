//! Page-level forecast data source: one fetch per committed place.

use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{model::WeatherData, place::PlaceReader, provider::WeatherSource};

/// Exactly one of these is shown by the data-dependent sections.
#[derive(Debug, Clone)]
pub enum ForecastState {
    Loading,
    Failed(String),
    Ready(Arc<WeatherData>),
}

impl ForecastState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ForecastState::Loading)
    }
}

/// Background task that refetches whenever the selected place changes.
///
/// A commit arriving mid-fetch abandons that fetch and starts over with the new
/// place. Failures are published, never retried.
#[derive(Debug)]
pub struct ForecastLoader {
    state: watch::Receiver<ForecastState>,
    task: JoinHandle<()>,
}

impl ForecastLoader {
    pub fn spawn(
        source: Arc<dyn WeatherSource>,
        mut places: PlaceReader,
        sample_count: u32,
    ) -> Self {
        let (tx, state) = watch::channel(ForecastState::Loading);

        let task = tokio::spawn(async move {
            loop {
                let place = places.current_and_mark_seen();
                tx.send_replace(ForecastState::Loading);
                debug!(place = %place, "Fetching forecast");

                let outcome = tokio::select! {
                    res = source.fetch_forecast(&place, sample_count) => Some(res),
                    changed = places.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        debug!(place = %place, "Forecast fetch superseded");
                        None
                    }
                };

                let Some(outcome) = outcome else { continue };
                let next = match outcome {
                    Ok(data) => ForecastState::Ready(Arc::new(data)),
                    Err(e) => {
                        warn!(place = %place, error = %e, "Forecast fetch failed");
                        ForecastState::Failed(e.to_string())
                    }
                };
                tx.send_replace(next);

                if places.changed().await.is_err() {
                    return;
                }
            }
        });

        Self { state, task }
    }

    pub fn state(&self) -> ForecastState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ForecastState> {
        self.state.clone()
    }

    /// Wait until the current fetch resolves to `Ready` or `Failed`.
    pub async fn settled(&mut self) -> ForecastState {
        match self.state.wait_for(|s| !s.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => ForecastState::Failed("forecast loader stopped".to_string()),
        }
    }
}

impl Drop for ForecastLoader {
    fn drop(&mut self) {
        self.task.abort();
    }
}
