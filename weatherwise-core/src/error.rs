use thiserror::Error;

/// Message shown when a search is submitted with an empty field.
pub const EMPTY_LOCATION_MESSAGE: &str = "Please enter a location";

/// Errors surfaced by the weather and place-lookup collaborators.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("Failed to reach {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The service answered with a non-2xx status.
    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to parse {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },

    /// User input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    #[error(
        "No OpenWeather API key configured.\n\
         Hint: run `weatherwise configure` or set OPENWEATHER_API_KEY."
    )]
    MissingApiKey,
}

impl WeatherError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn empty_location() -> Self {
        Self::validation(EMPTY_LOCATION_MESSAGE)
    }

    /// True for every failure that happened on the wire.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. }
        )
    }
}
