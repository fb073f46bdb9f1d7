//! HTTP client for the geocoding and weather endpoints.
//!
//! Token and locale are fixed at construction and baked into every URL.
//! No request timeout is configured: a hung call stays pending until the
//! caller drops or cancels it.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::error::WeatherError;
use crate::types::{
    DailyForecast, DailyResponse, Envelope, EnvelopeHeader, Place, PlaceSearchResponse,
    RealtimeConditions, RealtimeResponse,
};

const USER_AGENT: &str = "Skylark/0.1.0";
const REDACTED_TOKEN: &str = "***";

/// Receives every request and response the client sees.
pub trait HttpObserver: Send + Sync {
    fn on_request(&self, endpoint: &str, url: &str);
    fn on_response(&self, endpoint: &str, status: u16, body: &str);
    fn on_failure(&self, endpoint: &str, error: &str);
}

/// Default observer: logs through `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl HttpObserver for TracingObserver {
    fn on_request(&self, endpoint: &str, url: &str) {
        tracing::debug!(endpoint, "--> GET {}", url);
    }

    fn on_response(&self, endpoint: &str, status: u16, body: &str) {
        tracing::debug!(endpoint, status, "<-- {}", body);
    }

    fn on_failure(&self, endpoint: &str, error: &str) {
        tracing::debug!(endpoint, "<-- HTTP FAILED: {}", error);
    }
}

/// Endpoint descriptor: path template plus its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `v2/place?token=..&lang=..&query=..`
    PlaceSearch { query: &'a str },
    /// `v2.5/{token}/{lng},{lat}/realtime.json`
    Realtime { lng: &'a str, lat: &'a str },
    /// `v2.5/{token}/{lng},{lat}/daily.json`
    Daily { lng: &'a str, lat: &'a str },
}

impl Endpoint<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlaceSearch { .. } => "place",
            Self::Realtime { .. } => "realtime",
            Self::Daily { .. } => "daily",
        }
    }

    /// Full request URL under `base`.
    pub fn url(&self, base: &Url, token: &str, lang: &str) -> Result<Url, WeatherError> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| WeatherError::Transport {
                endpoint: self.name(),
                message: format!("base URL cannot carry a path: {}", base),
            })?;
            segments.pop_if_empty();
            match self {
                Self::PlaceSearch { .. } => {
                    segments.extend(["v2", "place"]);
                }
                Self::Realtime { lng, lat } => {
                    let coords = format!("{},{}", lng, lat);
                    segments.extend(["v2.5", token, coords.as_str(), "realtime.json"]);
                }
                Self::Daily { lng, lat } => {
                    let coords = format!("{},{}", lng, lat);
                    segments.extend(["v2.5", token, coords.as_str(), "daily.json"]);
                }
            }
        }

        if let Self::PlaceSearch { query } = self {
            url.query_pairs_mut()
                .append_pair("token", token)
                .append_pair("lang", lang)
                .append_pair("query", query);
        }

        Ok(url)
    }
}

/// Wire client for the weather/geocoding service.
#[derive(Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    base_url: Url,
    token: String,
    lang: String,
    observer: Arc<dyn HttpObserver>,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url.as_str())
            .field("lang", &self.lang)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    /// Create a client for `base_url` with a fixed token and locale.
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        lang: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Base URL cannot carry a path: {}", base_url);
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            token: token.into(),
            lang: lang.into(),
            observer: Arc::new(TracingObserver),
        })
    }

    /// Create a client from the application's API settings.
    pub fn from_config(api: &skylark_core::ApiConfig) -> anyhow::Result<Self> {
        Self::new(&api.base_url, api.token.clone(), api.lang.clone())
    }

    /// Replace the request/response observer.
    pub fn with_observer(mut self, observer: Arc<dyn HttpObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Search places matching `query`.
    #[instrument(skip(self), level = "info")]
    pub async fn search_places(&self, query: &str) -> Result<Vec<Place>, WeatherError> {
        let places = self
            .fetch::<PlaceSearchResponse>(Endpoint::PlaceSearch { query })
            .await?;
        tracing::info!("Found {} places", places.len());
        Ok(places)
    }

    /// Current conditions at the given coordinates.
    #[instrument(skip(self), level = "info")]
    pub async fn get_realtime_weather(
        &self,
        lng: &str,
        lat: &str,
    ) -> Result<RealtimeConditions, WeatherError> {
        self.fetch::<RealtimeResponse>(Endpoint::Realtime { lng, lat }).await
    }

    /// Multi-day forecast at the given coordinates.
    #[instrument(skip(self), level = "info")]
    pub async fn get_daily_weather(
        &self,
        lng: &str,
        lat: &str,
    ) -> Result<DailyForecast, WeatherError> {
        self.fetch::<DailyResponse>(Endpoint::Daily { lng, lat }).await
    }

    /// Issue a GET for `endpoint` and unwrap its envelope.
    async fn fetch<E: Envelope>(
        &self,
        endpoint: Endpoint<'_>,
    ) -> Result<E::Payload, WeatherError> {
        let name = endpoint.name();
        let url = endpoint.url(&self.base_url, &self.token, &self.lang)?;
        self.observer.on_request(name, &self.redacted_url(&endpoint)?);

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                let err = WeatherError::transport(name, &e);
                self.observer.on_failure(name, &err.to_string());
                return Err(err);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                let err = WeatherError::transport(name, &e);
                self.observer.on_failure(name, &err.to_string());
                return Err(err);
            }
        };
        self.observer.on_response(name, status.as_u16(), &body);

        if !status.is_success() {
            return Err(WeatherError::empty_body(name, format!("HTTP {}", status)));
        }

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(WeatherError::empty_body(name, "no content"));
        }

        let value: serde_json::Value = serde_json::from_str(trimmed)
            .map_err(|e| WeatherError::empty_body(name, format!("unparseable body: {}", e)))?;

        let header = EnvelopeHeader::deserialize(&value)
            .map_err(|e| WeatherError::empty_body(name, format!("unparseable body: {}", e)))?;
        if !header.is_ok() {
            tracing::warn!("{} request rejected with status {}", name, header.status);
            return Err(WeatherError::RemoteStatus {
                endpoint: name,
                status: header.status,
            });
        }

        let envelope: E = serde_json::from_value(value)
            .map_err(|e| WeatherError::empty_body(name, format!("malformed payload: {}", e)))?;

        envelope
            .into_payload()
            .ok_or_else(|| WeatherError::empty_body(name, "missing payload"))
    }

    /// URL text safe for logs: the same request built with a placeholder token.
    fn redacted_url(&self, endpoint: &Endpoint<'_>) -> Result<String, WeatherError> {
        Ok(endpoint
            .url(&self.base_url, REDACTED_TOKEN, &self.lang)?
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::Location;
    use parking_lot::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingObserver {
        lines: Mutex<Vec<String>>,
    }

    impl HttpObserver for RecordingObserver {
        fn on_request(&self, endpoint: &str, url: &str) {
            self.lines.lock().push(format!("request {} {}", endpoint, url));
        }

        fn on_response(&self, endpoint: &str, status: u16, body: &str) {
            self.lines.lock().push(format!("response {} {} {}", endpoint, status, body));
        }

        fn on_failure(&self, endpoint: &str, error: &str) {
            self.lines.lock().push(format!("failure {} {}", endpoint, error));
        }
    }

    fn client(server: &MockServer) -> WeatherClient {
        WeatherClient::new(&server.uri(), "test-token", "zh_CN").unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let base = Url::parse("https://api.example.com").unwrap();

        let search = Endpoint::PlaceSearch { query: "New York" }
            .url(&base, "tok", "zh_CN")
            .unwrap();
        assert_eq!(
            search.as_str(),
            "https://api.example.com/v2/place?token=tok&lang=zh_CN&query=New+York"
        );

        let realtime = Endpoint::Realtime {
            lng: "116.41",
            lat: "39.92",
        }
        .url(&base, "tok", "zh_CN")
        .unwrap();
        assert_eq!(
            realtime.as_str(),
            "https://api.example.com/v2.5/tok/116.41,39.92/realtime.json"
        );

        let daily = Endpoint::Daily {
            lng: "116.41",
            lat: "39.92",
        }
        .url(&base, "tok", "zh_CN")
        .unwrap();
        assert_eq!(daily.path(), "/v2.5/tok/116.41,39.92/daily.json");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("https://proxy.example.com/caiyun/").unwrap();
        let url = Endpoint::Daily { lng: "1", lat: "2" }
            .url(&base, "tok", "zh_CN")
            .unwrap();
        assert_eq!(url.path(), "/caiyun/v2.5/tok/1,2/daily.json");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(WeatherClient::new("not a url", "tok", "zh_CN").is_err());
        assert!(WeatherClient::new("mailto:someone@example.com", "tok", "zh_CN").is_err());
    }

    #[tokio::test]
    async fn test_search_places() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/place"))
            .and(query_param("token", "test-token"))
            .and(query_param("lang", "zh_CN"))
            .and(query_param("query", "Beijing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "query": "Beijing",
                "places": [{
                    "id": "B000A83AJN",
                    "name": "Beijing",
                    "location": {"lng": "116.41", "lat": "39.92"},
                    "formatted_address": "Beijing, China"
                }]
            })))
            .mount(&mock_server)
            .await;

        let places = client(&mock_server).search_places("Beijing").await.unwrap();

        assert_eq!(
            places,
            vec![Place::new(
                "Beijing",
                Location::new("116.41", "39.92"),
                "Beijing, China"
            )]
        );
    }

    #[tokio::test]
    async fn test_non_ok_status_is_remote_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/place"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "failed",
                "error": "'token' is invalid"
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).search_places("x").await.unwrap_err();

        assert_eq!(
            err,
            WeatherError::RemoteStatus {
                endpoint: "place",
                status: "failed".into()
            }
        );
        assert!(err.to_string().contains("failed"));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2.5/test-token/1,2/realtime.json"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .get_realtime_weather("1", "2")
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::EmptyBody { endpoint: "realtime", .. }));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2.5/test-token/1,2/daily.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).get_daily_weather("1", "2").await.unwrap_err();

        match err {
            WeatherError::EmptyBody { endpoint, reason } => {
                assert_eq!(endpoint, "daily");
                assert!(reason.contains("unparseable"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_is_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/place"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).search_places("x").await.unwrap_err();

        match err {
            WeatherError::EmptyBody { reason, .. } => assert!(reason.contains("500")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ok_without_payload_is_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2.5/test-token/1,2/realtime.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok"
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .get_realtime_weather("1", "2")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WeatherError::EmptyBody { reason, .. } if reason == "missing payload"
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Nothing listens on a port we bound and released.
        let uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let client = WeatherClient::new(&uri, "test-token", "zh_CN").unwrap();
        let err = client.search_places("x").await.unwrap_err();

        assert!(matches!(err, WeatherError::Transport { endpoint: "place", .. }));
    }

    #[tokio::test]
    async fn test_observer_sees_redacted_request_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2.5/test-token/1,2/realtime.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "result": {"realtime": {
                    "skycon": "FOG",
                    "temperature": 3.0,
                    "air_quality": {"aqi": {"chn": 120.0}}
                }}
            })))
            .mount(&mock_server)
            .await;

        let observer = Arc::new(RecordingObserver::default());
        let client = client(&mock_server).with_observer(observer.clone());
        let realtime = client.get_realtime_weather("1", "2").await.unwrap();
        assert_eq!(realtime.skycon, "FOG");

        let lines = observer.lines.lock();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("request realtime"));
        assert!(lines[0].contains("/v2.5/***/1,2/realtime.json"));
        assert!(!lines[0].contains("test-token"));
        assert!(lines[1].starts_with("response realtime 200"));
        assert!(lines[1].contains("FOG"));
    }

    #[tokio::test]
    async fn test_percent_encoded_token_is_redacted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "places": []
            })))
            .mount(&mock_server)
            .await;

        let observer = Arc::new(RecordingObserver::default());
        let client = WeatherClient::new(&mock_server.uri(), "s3cr et/+?", "zh_CN")
            .unwrap()
            .with_observer(observer.clone());
        client.search_places("x").await.unwrap();
        client.get_daily_weather("1", "2").await.unwrap_err();

        let lines = observer.lines.lock();
        let requests: Vec<_> = lines.iter().filter(|l| l.starts_with("request")).collect();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("token=***&"));
        assert!(requests[1].contains("/v2.5/***/1,2/daily.json"));
        for line in requests {
            assert!(!line.contains("s3cr"), "token leaked: {}", line);
        }
    }

    #[tokio::test]
    async fn test_rejection_keeps_status_despite_malformed_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/place"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "failed",
                "places": [{"name": "x"}]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2.5/test-token/1,2/realtime.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "quota_exceeded",
                "result": {}
            })))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);

        let err = client.search_places("x").await.unwrap_err();
        assert_eq!(
            err,
            WeatherError::RemoteStatus {
                endpoint: "place",
                status: "failed".into()
            }
        );

        let err = client.get_realtime_weather("1", "2").await.unwrap_err();
        assert_eq!(err.status_fragment(), "quota_exceeded");
        assert!(err.to_string().contains("quota_exceeded"));
    }

    #[tokio::test]
    async fn test_ok_with_malformed_payload_is_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/place"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "places": [{"name": "x"}]
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).search_places("x").await.unwrap_err();

        assert!(matches!(
            err,
            WeatherError::EmptyBody { endpoint: "place", reason }
                if reason.starts_with("malformed payload")
        ));
    }
}
