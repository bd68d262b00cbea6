//! Interactive location search with debounced suggestions.

use anyhow::{Context, Result};
use inquire::{
    CustomUserError, Text,
    autocompletion::{Autocomplete, Replacement},
};
use std::sync::Arc;
use tracing::debug;
use weatherwise_core::{
    Config, SearchSettings, SelectedPlace, SuggestionFetcher, WeatherError,
    provider::provider_from_config,
};

/// Feeds every keystroke to the fetcher and offers whatever it currently shows.
///
/// The prompt only asks for suggestions on a keystroke, and lookups settle
/// after the debounce interval. So the list shown is the one from the
/// previous settled query, refreshed by the next key pressed.
#[derive(Debug, Clone)]
struct PlaceCompleter {
    fetcher: SuggestionFetcher,
}

impl Autocomplete for PlaceCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        if self.fetcher.state().text != input {
            self.fetcher.on_input(input);
        }
        let state = self.fetcher.state();
        if let Some(error) = state.error {
            return Ok(vec![format!("({error})")]);
        }
        Ok(if state.visible { state.suggestions } else { Vec::new() })
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion.filter(|s| !s.starts_with('(')))
    }
}

/// Prompt until a place is committed; returns it.
pub async fn pick_place(config: &Config) -> Result<Arc<str>> {
    let provider = Arc::new(provider_from_config(config)?);
    let (writer, _) = SelectedPlace::new(config.default_place.as_str());
    let fetcher = SuggestionFetcher::new(provider, SearchSettings::from(&config.search), writer);

    loop {
        let completer = PlaceCompleter {
            fetcher: fetcher.clone(),
        };
        let answer = tokio::task::spawn_blocking(move || {
            Text::new("Search location:")
                .with_help_message("type at least 3 characters for suggestions")
                .with_autocomplete(completer)
                .prompt()
        })
        .await
        .context("Search prompt task failed")?
        .context("Search prompt was cancelled")?;

        let answer = answer.trim().to_string();
        if fetcher.state().suggestions.contains(&answer) {
            debug!(place = %answer, "Suggestion selected");
            fetcher.select(&answer);
            return Ok(fetcher.place().current());
        }

        fetcher.set_text(&answer);
        match fetcher.submit().await {
            Ok(place) => return Ok(place),
            Err(WeatherError::Validation(message)) => eprintln!("{message}"),
            Err(e) => return Err(e.into()),
        }
    }
}
