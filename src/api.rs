use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{AirlineDelay, Airport, PerformerStat, Prediction, RouteStat};

/// What went wrong talking to the delay service. The UI collapses all three
/// into a per-panel failure message; the distinction only reaches the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Parse(#[source] reqwest::Error),
}

/// Client for the flight-delay REST service.
pub struct DelayApi {
    client: Client,
    base_url: String,
}

impl DelayApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response.json::<T>().await.map_err(ApiError::Parse)
    }

    pub async fn airports(&self) -> Result<Vec<Airport>, ApiError> {
        self.get_json("/airports", &[]).await
    }

    pub async fn predict(&self, day_of_week: u8, airport_id: i64) -> Result<Prediction, ApiError> {
        self.get_json(
            "/predict",
            &[
                ("day_of_week", day_of_week.to_string()),
                ("airport_id", airport_id.to_string()),
            ],
        )
        .await
    }

    pub async fn most_delayed_routes(&self, top_n: usize) -> Result<Vec<RouteStat>, ApiError> {
        self.get_json("/most_delayed_routes", &[("top_n", top_n.to_string())])
            .await
    }

    pub async fn best_performers(&self, top_n: usize) -> Result<Vec<PerformerStat>, ApiError> {
        self.get_json("/best_performers", &[("top_n", top_n.to_string())])
            .await
    }

    // The airline sheet's column names drift between exports, so rows come
    // back as raw values and get normalized here.
    pub async fn airline_delays(&self) -> Result<Vec<AirlineDelay>, ApiError> {
        let rows: Vec<Value> = self.get_json("/airline_delays", &[]).await?;
        Ok(rows.iter().map(AirlineDelay::from_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testserver::TestServer;

    fn api(server: &TestServer) -> DelayApi {
        DelayApi::new(server.base_url(), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn airports_decodes_renamed_columns() {
        let server = TestServer::start().await;
        server.route(
            "/airports",
            200,
            r#"[{"airport_id": 10140, "airport_name": "Albuquerque, NM"}]"#,
        );

        let airports = api(&server).airports().await.unwrap();
        assert_eq!(airports.len(), 1);
        assert_eq!(airports[0].id, 10140);
        assert_eq!(airports[0].name, "Albuquerque, NM");
    }

    #[tokio::test]
    async fn predict_sends_day_and_airport() {
        let server = TestServer::start().await;
        server.route(
            "/predict",
            200,
            r#"{"airport_id": 10140, "airport_name": "Albuquerque, NM",
                "day_of_week": 2, "delay_chance": "7.25%", "confidence_percent": 92.1}"#,
        );

        let prediction = api(&server).predict(2, 10140).await.unwrap();
        assert_eq!(prediction.delay_chance.as_deref(), Some("7.25%"));
        assert_eq!(
            server.requests(),
            vec!["/predict?day_of_week=2&airport_id=10140"]
        );
    }

    #[tokio::test]
    async fn stats_endpoints_pass_top_n() {
        let server = TestServer::start().await;
        server.route("/most_delayed_routes", 200, "[]");
        server.route("/best_performers", 200, "[]");

        let api = api(&server);
        api.most_delayed_routes(1).await.unwrap();
        api.best_performers(5).await.unwrap();

        let requests = server.requests();
        assert!(requests.contains(&"/most_delayed_routes?top_n=1".to_string()));
        assert!(requests.contains(&"/best_performers?top_n=5".to_string()));
    }

    #[tokio::test]
    async fn airline_rows_tolerate_mixed_columns() {
        let server = TestServer::start().await;
        server.route(
            "/airline_delays",
            200,
            r#"[{"Airline": "Skyway", "delay_chance": "18.2%"},
                {"airline": "Northbound", "delay_chance": "9.1%"},
                {"airline_id": 42, "delay_chance": "5.0%"}]"#,
        );

        let rows = api(&server).airline_delays().await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.airline.as_str()).collect();
        assert_eq!(names, vec!["Skyway", "Northbound", "42"]);
    }

    #[tokio::test]
    async fn server_errors_surface_the_status_code() {
        let server = TestServer::start().await;
        server.route("/airports", 500, "boom");

        let err = api(&server).airports().await.unwrap_err();
        assert!(matches!(err, ApiError::Status(500)), "got {:?}", err);
    }

    #[tokio::test]
    async fn malformed_bodies_surface_as_parse_errors() {
        let server = TestServer::start().await;
        server.route("/airports", 200, "{not json");

        let err = api(&server).airports().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn unreachable_hosts_surface_as_network_errors() {
        let unreachable = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            format!("http://{}", listener.local_addr().unwrap())
            // listener drops here, so the port refuses connections
        };

        let api = DelayApi::new(unreachable, Duration::from_secs(2));
        let err = api.airports().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    }
}
