// USGS GeoJSON summary feed client
use crate::application::feed_client::{FeedClient, FeedError};
use crate::domain::event::Event;
use crate::domain::query::RefreshQuery;
use crate::infrastructure::config::render_template;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UsgsFeedClient {
    client: reqwest::Client,
    url_template: String,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<String>,
    properties: Properties,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    mag: Option<f64>,
    #[serde(default)]
    time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

impl UsgsFeedClient {
    pub fn new(url_template: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url_template,
        })
    }

    pub fn feed_url(&self, query: &RefreshQuery) -> String {
        let mut vars = HashMap::new();
        vars.insert("feed".to_string(), query.feed_name());
        render_template(&self.url_template, &vars)
    }
}

/// Decode a GeoJSON feature collection.
///
/// Features without a full `[lon, lat, depth]` triple or with a missing or
/// out-of-range timestamp are skipped; a body that is not a collection is a parse failure.
pub fn parse_feed(body: &str) -> Result<Vec<Event>, FeedError> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|e| FeedError::ParseFailure(e.to_string()))?;

    let mut events = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let id = feature.id.unwrap_or_else(|| format!("feature-{}", index));

        let Some(&[longitude, latitude, depth_km, ..]) =
            feature.geometry.as_ref().map(|g| g.coordinates.as_slice())
        else {
            tracing::warn!("Skipping feature {} without full coordinates", id);
            continue;
        };

        let Some(time) = feature
            .properties
            .time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        else {
            tracing::warn!("Skipping feature {} with missing or invalid time", id);
            continue;
        };

        events.push(Event::new(
            id,
            feature
                .properties
                .place
                .unwrap_or_else(|| "Unknown location".to_string()),
            feature.properties.mag,
            depth_km,
            time,
            latitude,
            longitude,
        ));
    }

    Ok(events)
}

#[async_trait]
impl FeedClient for UsgsFeedClient {
    async fn fetch(&self, query: &RefreshQuery) -> Result<Vec<Event>, FeedError> {
        let url = self.feed_url(query);
        tracing::debug!("Fetching feed {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FeedError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::NetworkFailure(format!("feed responded with status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::NetworkFailure(e.to_string()))?;

        parse_feed(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::TimeWindow;
    use axum::{extract::Path, http::StatusCode, routing::get, Router};

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {"count": 3},
        "features": [
            {
                "type": "Feature",
                "id": "ci40123456",
                "properties": {"mag": 4.7, "place": "12 km NE of Ojai, CA", "time": 1700000000000},
                "geometry": {"type": "Point", "coordinates": [-119.15, 34.52, 9.8]}
            },
            {
                "type": "Feature",
                "id": "ak0241x",
                "properties": {"mag": null, "place": null, "time": 1700000060000},
                "geometry": {"type": "Point", "coordinates": [-150.1, 61.3, 35.0]}
            },
            {
                "type": "Feature",
                "id": "broken",
                "properties": {"mag": 2.0, "place": "Nowhere", "time": 1700000120000},
                "geometry": {"type": "Point", "coordinates": [10.0]}
            }
        ]
    }"#;

    #[test]
    fn test_parse_feed() {
        let events = parse_feed(SAMPLE).unwrap();
        assert_eq!(events.len(), 2);

        let first = &events[0];
        assert_eq!(first.id, "ci40123456");
        assert_eq!(first.place, "12 km NE of Ojai, CA");
        assert_eq!(first.magnitude, Some(4.7));
        assert_eq!(first.longitude, -119.15);
        assert_eq!(first.latitude, 34.52);
        assert_eq!(first.depth_km, 9.8);
        assert_eq!(first.time.timestamp_millis(), 1_700_000_000_000);

        assert_eq!(events[1].magnitude, None);
        assert_eq!(events[1].place, "Unknown location");
    }

    #[test]
    fn test_parse_feed_skips_features_without_time() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {"id": "null-time", "properties": {"mag": 3.1, "place": "A", "time": null},
                 "geometry": {"coordinates": [1.0, 2.0, 3.0]}},
                {"id": "no-time", "properties": {"mag": 3.2, "place": "B"},
                 "geometry": {"coordinates": [1.0, 2.0, 3.0]}},
                {"id": "kept", "properties": {"mag": 3.3, "place": "C", "time": 1700000000000},
                 "geometry": {"coordinates": [1.0, 2.0, 3.0]}}
            ]
        }"#;

        let events = parse_feed(body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "kept");
    }

    #[test]
    fn test_parse_feed_rejects_malformed_body() {
        assert!(matches!(parse_feed("<html>"), Err(FeedError::ParseFailure(_))));
        assert!(matches!(parse_feed(r#"{"type":"FeatureCollection"}"#), Err(FeedError::ParseFailure(_))));
    }

    #[test]
    fn test_feed_url() {
        let client = UsgsFeedClient::new(
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/${feed}.geojson".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            client.feed_url(&RefreshQuery::new(TimeWindow::parse("bogus"), "4.5")),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_day.geojson"
        );
        assert_eq!(
            client.feed_url(&RefreshQuery::new(TimeWindow::Hour, "4.5")),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson"
        );
    }

    async fn serve_feed() -> String {
        async fn feed(Path(name): Path<String>) -> (StatusCode, &'static str) {
            match name.as_str() {
                "2.5_day.geojson" => (StatusCode::OK, SAMPLE),
                "significant_month.geojson" => (StatusCode::OK, "{not json"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable"),
            }
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route("/summary/:name", get(feed));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/summary/${{feed}}.geojson", addr)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let client = UsgsFeedClient::new(serve_feed().await, Duration::from_secs(5)).unwrap();
        let events = client
            .fetch(&RefreshQuery::new(TimeWindow::Day, "2.5"))
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_network_failure() {
        let client = UsgsFeedClient::new(serve_feed().await, Duration::from_secs(5)).unwrap();
        let result = client.fetch(&RefreshQuery::new(TimeWindow::Week, "4.5")).await;
        assert!(matches!(result, Err(FeedError::NetworkFailure(msg)) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_parse_failure() {
        let client = UsgsFeedClient::new(serve_feed().await, Duration::from_secs(5)).unwrap();
        let result = client
            .fetch(&RefreshQuery::new(TimeWindow::Month, "significant"))
            .await;
        assert!(matches!(result, Err(FeedError::ParseFailure(_))));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_network_failure() {
        let client = UsgsFeedClient::new(
            "http://127.0.0.1:1/${feed}.geojson".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();
        let result = client.fetch(&RefreshQuery::new(TimeWindow::Day, "2.5")).await;
        assert!(matches!(result, Err(FeedError::NetworkFailure(_))));
    }
}
