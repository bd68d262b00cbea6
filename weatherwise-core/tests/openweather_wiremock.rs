//! OpenWeather client against a mock HTTP server.

use std::{sync::Arc, time::Duration};

use weatherwise_core::{
    OpenWeatherProvider, PlaceLookup, SearchPhase, SearchSettings, SelectedPlace,
    SuggestionFetcher, WeatherError, WeatherSource,
    config::ForecastConfig,
    forecast::{self, DAYTIME_START_HOUR},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const API_KEY: &str = "test-key";

fn forecast_body() -> serde_json::Value {
    let list: Vec<serde_json::Value> = (0..16)
        .map(|i| {
            serde_json::json!({
                "dt": 1_702_944_000_i64 + i * 10_800,
                "main": {
                    "temp": 296.37, "feels_like": 295.8, "temp_min": 294.1,
                    "temp_max": 297.0, "pressure": 1013, "sea_level": 1013,
                    "grnd_level": 1009, "humidity": 64, "temp_kf": 0.0
                },
                "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
                "clouds": { "all": 0 },
                "wind": { "speed": 1.64, "deg": 210, "gust": 2.1 },
                "visibility": 10000,
                "pop": 0,
                "sys": { "pod": "d" },
                "dt_txt": "2023-12-19 00:00:00"
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": 16,
        "list": list,
        "city": {
            "id": 2643743,
            "name": "London",
            "coord": { "lat": 51.5085, "lon": -0.1257 },
            "country": "GB",
            "population": 1000000,
            "timezone": 0,
            "sunrise": 1702972800,
            "sunset": 1703001600
        }
    })
}

fn create_test_client(mock_server: &MockServer) -> OpenWeatherProvider {
    let config = ForecastConfig {
        base_url: mock_server.uri(),
        timeout_secs: 5,
        ..Default::default()
    };
    OpenWeatherProvider::new(API_KEY.to_string(), &config).expect("Failed to create client")
}

#[tokio::test]
async fn forecast_is_decoded_and_normalized() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "London"))
        .and(query_param("cnt", "56"))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let data = client
        .fetch_forecast("London", 56)
        .await
        .expect("forecast should load");

    assert_eq!(data.city.name, "London");
    assert_eq!(data.city.country.as_deref(), Some("GB"));
    assert_eq!(data.city.latitude, 51.5085);
    assert_eq!(data.list.len(), 16);

    let dates = forecast::group_by_date(&data.list, Some(6));
    assert_eq!(dates.len(), 2);

    let series = forecast::to_chart_series(&data.list, &chrono::Utc);
    assert_eq!(series.len(), data.list.len());

    let rep = forecast::pick_representative(&data.list, dates[0], &chrono::Utc, DAYTIME_START_HOUR)
        .expect("daytime sample exists");
    assert_eq!(rep.timestamp, 1_702_944_000 + 2 * 10_800);
}

#[tokio::test]
async fn unknown_city_is_a_status_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.fetch_forecast("Atlantis", 56).await.unwrap_err();

    assert!(err.is_network_failure());
    match err {
        WeatherError::Status { status, body, .. } => {
            assert_eq!(status, 404);
            assert!(body.contains("city not found"));
        },
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_forecast_is_a_decode_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.fetch_forecast("London", 56).await.unwrap_err();
    assert!(matches!(err, WeatherError::Decode { .. }));
}

#[tokio::test]
async fn lookup_returns_names_in_order() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/find"))
        .and(query_param("q", "Par"))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "accurate",
            "cod": "200",
            "count": 3,
            "list": [
                { "id": 2988507, "name": "Paris", "coord": { "lat": 48.85, "lon": 2.35 } },
                { "id": 4717560, "name": "Paris", "coord": { "lat": 33.66, "lon": -95.55 } },
                { "id": 3172394, "name": "Parma", "coord": { "lat": 44.8, "lon": 10.33 } }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let names = client.lookup("Par").await.expect("lookup should succeed");
    assert_eq!(names, vec!["Paris", "Paris", "Parma"]);
}

#[tokio::test]
async fn lookup_without_matches_is_empty() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/find"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "accurate", "cod": "200", "count": 0, "list": []
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    assert!(client.lookup("Qqq").await.expect("lookup").is_empty());
}

#[tokio::test]
async fn fetcher_surfaces_lookup_failure_inline() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/find"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let client = Arc::new(create_test_client(&mock_server));
    let (writer, _reader) = SelectedPlace::new("London");
    let settings = SearchSettings {
        debounce: Duration::from_millis(20),
        ..SearchSettings::default()
    };
    let fetcher = SuggestionFetcher::new(client, settings, writer);
    let mut rx = fetcher.subscribe();

    fetcher.on_input("Berl");
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.phase == SearchPhase::Failed),
    )
    .await
    .expect("lookup settles")
    .expect("fetcher alive")
    .clone();

    assert_eq!(state.error.as_deref(), Some("Unable to fetch suggestions"));
    assert!(state.suggestions.is_empty());
    assert!(!state.visible);
}
