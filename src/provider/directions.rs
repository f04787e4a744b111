//! HTTP directions client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{ResolvedRoute, RouteProvider};
use crate::config::ProviderConfig;
use crate::error::{Result, SignpostError};

/// Client for a Google-Directions-shaped web API.
///
/// The base URL comes from configuration so tests can point the client at a
/// local mock server.
#[derive(Debug)]
pub struct DirectionsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DirectionsClient {
    /// Build a client from provider configuration.
    ///
    /// Fails with a configuration error when no API key is set.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            SignpostError::new(
                crate::ErrorCode::MissingConfiguration,
                "Provider API key is not configured",
            )
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(SignpostError::from)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl RouteProvider for DirectionsClient {
    async fn resolve(&self, origin: &str, destination: &str) -> Result<ResolvedRoute> {
        let url = format!("{}/maps/api/directions/json", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: DirectionsResponse = response.json().await?;
        if body.status != "OK" {
            return Err(SignpostError::provider(format!(
                "Directions lookup failed with status {}",
                body.status
            )));
        }

        let route = body
            .routes
            .first()
            .ok_or_else(|| SignpostError::provider("Directions response contains no routes"))?;
        let leg = route
            .legs
            .first()
            .ok_or_else(|| SignpostError::provider("Directions route contains no legs"))?;

        debug!(origin, destination, "Route resolved");
        Ok(ResolvedRoute {
            duration_text: leg.duration.text.clone(),
            distance_text: leg.distance.text.clone(),
            encoded_path: route.overview_polyline.points.clone(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Wire Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: Polyline,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct Leg {
    duration: TextValue,
    distance: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let config = ProviderConfig::default();
        let error = DirectionsClient::new(&config).unwrap_err();
        assert_eq!(error.code(), crate::ErrorCode::MissingConfiguration);
    }

    #[test]
    fn test_response_deserialization() {
        let json = serde_json::json!({
            "status": "OK",
            "routes": [{
                "overview_polyline": { "points": "a~l~Fjk~uOwHJy@P" },
                "legs": [{
                    "duration": { "text": "10 mins", "value": 600 },
                    "distance": { "text": "5 km", "value": 5000 }
                }]
            }]
        });

        let body: DirectionsResponse = serde_json::from_value(json).unwrap();
        assert_eq!(body.status, "OK");
        assert_eq!(body.routes[0].legs[0].duration.text, "10 mins");
        assert_eq!(body.routes[0].overview_polyline.points, "a~l~Fjk~uOwHJy@P");
    }

    #[test]
    fn test_zero_results_has_no_routes() {
        let json = serde_json::json!({ "status": "ZERO_RESULTS" });
        let body: DirectionsResponse = serde_json::from_value(json).unwrap();
        assert_eq!(body.status, "ZERO_RESULTS");
        assert!(body.routes.is_empty());
    }
}
