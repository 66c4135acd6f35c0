//! Live HTTP clients against wiremock servers

use std::sync::Arc;
use std::time::Duration;

use airq_acquire::{
    AcquireError, AirQualityProvider, Geocoder, GeocodingService, NoCache, NominatimService,
    OpenWeatherClient, DEFAULT_USER_AGENT,
};
use airq_core::Coordinates;
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";

fn london() -> Coordinates {
    Coordinates::new(51.5074, -0.1278).unwrap()
}

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::new(&server.uri(), KEY, Duration::from_secs(5)).unwrap()
}

fn pollution_body() -> serde_json::Value {
    json!({
        "coord": {"lon": -0.1278, "lat": 51.5074},
        "list": [{
            "main": {"aqi": 3},
            "components": {"co": 230.3, "no": 0.2, "no2": 28.1, "o3": 51.5,
                           "so2": 2.1, "pm2_5": 14.2, "pm10": 19.8, "nh3": 0.9},
            "dt": 1720000000
        }]
    })
}

#[tokio::test]
async fn test_current_pollution_request_and_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .and(query_param("lat", "51.5074"))
        .and(query_param("lon", "-0.1278"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(pollution_body()))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client(&server).fetch_current_pollution(london()).await.unwrap();

    assert_eq!(payload.list.len(), 1);
    assert_eq!(payload.list[0].main.aqi, 3);
    assert_eq!(payload.list[0].components.pm2_5, 14.2);
}

#[tokio::test]
async fn test_successful_response_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pollution_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = client.fetch_current_pollution(london()).await.unwrap();
    let second = client.fetch_current_pollution(london()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_nearby_coordinates_do_not_share_cache_entries() {
    let server = MockServer::start().await;
    for (lat, aqi) in [("51.50741", 1), ("51.50744", 5)] {
        let mut body = pollution_body();
        body["list"][0]["main"]["aqi"] = json!(aqi);
        Mock::given(method("GET"))
            .and(path("/data/2.5/air_pollution"))
            .and(query_param("lat", lat))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client(&server);
    let first = client
        .fetch_current_pollution(Coordinates::new(51.50741, -0.1278).unwrap())
        .await
        .unwrap();
    let second = client
        .fetch_current_pollution(Coordinates::new(51.50744, -0.1278).unwrap())
        .await
        .unwrap();

    assert_eq!(first.list[0].main.aqi, 1);
    assert_eq!(second.list[0].main.aqi, 5);
}

#[tokio::test]
async fn test_no_cache_hits_server_every_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pollution_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server).with_cache(Arc::new(NoCache));
    client.fetch_current_pollution(london()).await.unwrap();
    client.fetch_current_pollution(london()).await.unwrap();
}

#[tokio::test]
async fn test_error_status_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    for _ in 0..2 {
        let err = client.fetch_current_weather(london()).await.unwrap_err();
        match err {
            AcquireError::ProviderErrorResponse { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_weather_requests_metric_units() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
            "main": {"temp": 21.4, "humidity": 40},
            "wind": {"speed": 3.1},
            "dt": 1720000000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let weather = client(&server).fetch_current_weather(london()).await.unwrap();
    assert_eq!(weather.main.temp, 21.4);
    assert_eq!(weather.weather[0].main, "Clear");
}

#[tokio::test]
async fn test_forecast_step_count() {
    let server = MockServer::start().await;
    let entries: Vec<_> = (0..40)
        .map(|i| {
            json!({
                "dt": 1720000000 + i * 10800,
                "main": {"temp": 15.0, "humidity": 60},
                "wind": {"speed": 2.0},
                "weather": [{"main": "Clouds"}]
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("cnt", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "list": entries })))
        .expect(1)
        .mount(&server)
        .await;

    // horizons past five days are capped at 40 steps
    let forecast = client(&server).fetch_forecast(london(), 9).await.unwrap();
    assert_eq!(forecast.len(), 40);
    assert_eq!(forecast[1].dt, Some(1_720_010_800));
}

#[tokio::test]
async fn test_history_window() {
    let server = MockServer::start().await;
    let at = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
    let end = at.timestamp();
    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution/history"))
        .and(query_param("start", (end - 3600).to_string()))
        .and(query_param("end", end.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(pollution_body()))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client(&server)
        .fetch_historical_pollution(london(), at)
        .await
        .unwrap();
    assert_eq!(payload.list[0].dt, Some(1_720_000_000));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_current_pollution(london())
        .await
        .unwrap_err();
    assert!(matches!(err, AcquireError::InvalidPayload(_)));
}

#[tokio::test]
async fn test_unreachable_provider() {
    let client = OpenWeatherClient::new("http://127.0.0.1:9", KEY, Duration::from_secs(2)).unwrap();
    let err = client.fetch_current_pollution(london()).await.unwrap_err();
    assert!(matches!(err, AcquireError::ProviderUnavailable(_)));
}

#[tokio::test]
async fn test_nominatim_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Paris"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "48.8588897", "lon": "2.3200410", "display_name": "Paris, France"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service =
        NominatimService::new(&server.uri(), DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap();
    assert_eq!(
        service.search("Paris").await.unwrap(),
        Some((48.8588897, 2.3200410))
    );
    assert_eq!(service.search("Xyzzy").await.unwrap(), None);
}

#[tokio::test]
async fn test_geocoder_over_nominatim_falls_through_variants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "city of Bath"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "51.3813864", "lon": "-2.3596963"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let service =
        NominatimService::new(&server.uri(), DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap();
    let geocoder = Geocoder::new(Box::new(service)).with_min_delay(Duration::ZERO);

    let coords = geocoder.resolve("Bath").await.unwrap();
    assert_eq!(coords.latitude(), 51.3813864);
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(3));
}
