//! The routes directory and its enrichment mapping.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ROUTES, SERVICE_NAME};
use crate::directory::ResourceDirectory;
use crate::enrichment::{Enricher, Enrichment, EnrichmentConfig, EnrichmentPipeline};
use crate::error::{Result, SignpostError};
use crate::provider::RouteProvider;
use crate::validation::{
    validate_field, MaxLength, Required, Validate, ValidationErrors, ValidationResult,
};

/// A named place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub name: String,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Validate for Place {
    fn validate(&self) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_field(&mut errors, "name", &self.name, &[&Required]);
        errors.into_result()
    }
}

/// A route between two places.
///
/// `consuming_time`, `distance` and `path` start unset and are filled in by
/// enrichment once the provider has resolved the route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePayload {
    /// Display name of the route.
    pub name: String,

    /// Where the route starts. Optional at creation; a route without an
    /// origin is never enriched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Place>,

    /// Where the route ends.
    pub destination: Option<Place>,

    /// Travel time as reported by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consuming_time: Option<String>,

    /// Distance as reported by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,

    /// Encoded polyline of the route geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl RoutePayload {
    /// A fresh, unenriched route.
    pub fn new(name: impl Into<String>, origin: Option<Place>, destination: Place) -> Self {
        Self {
            name: name.into(),
            origin,
            destination: Some(destination),
            consuming_time: None,
            distance: None,
            path: None,
        }
    }
}

impl Validate for RoutePayload {
    fn validate(&self) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_field(&mut errors, "name", &self.name, &[&Required, &MaxLength(128)]);

        match &self.destination {
            None => errors.add_required("destination"),
            Some(destination) => {
                if let Err(nested) = destination.validate() {
                    errors.merge_with_prefix("destination", nested);
                }
            }
        }

        errors.into_result()
    }
}

/// Maps a route payload to a provider lookup and back.
pub struct RouteEnricher {
    provider: Arc<dyn RouteProvider>,
}

impl RouteEnricher {
    pub fn new(provider: Arc<dyn RouteProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Enricher<RoutePayload> for RouteEnricher {
    async fn enrich(&self, mut current: RoutePayload) -> Result<Enrichment<RoutePayload>> {
        let origin = current.origin.as_ref().ok_or_else(|| {
            SignpostError::new(
                crate::ErrorCode::MissingRequiredField,
                "Route has no origin to resolve from",
            )
        })?;
        let destination = current.destination.as_ref().ok_or_else(|| {
            SignpostError::new(
                crate::ErrorCode::MissingRequiredField,
                "Route has no destination to resolve to",
            )
        })?;

        let resolved = self
            .provider
            .resolve(&origin.name, &destination.name)
            .await?;

        current.consuming_time = Some(resolved.duration_text);
        current.distance = Some(resolved.distance_text);
        current.path = Some(resolved.encoded_path);

        Ok(Enrichment {
            payload: current,
            changed_fields: vec![
                "consumingTime".to_string(),
                "distance".to_string(),
                "path".to_string(),
            ],
        })
    }
}

/// Build the routes directory, wired to enrich every created route through
/// `provider`.
pub fn routes_directory(
    provider: Arc<dyn RouteProvider>,
    enrichment: &EnrichmentConfig,
) -> ResourceDirectory<RoutePayload> {
    let pipeline =
        EnrichmentPipeline::with_config(Arc::new(RouteEnricher::new(provider)), enrichment.clone());
    ResourceDirectory::builder(SERVICE_NAME, ROUTES)
        .enrichment(pipeline)
        .build()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ResolvedRoute;

    fn valid_route() -> RoutePayload {
        RoutePayload::new(
            "commute",
            Some(Place::new("Munich")),
            Place::new("Stuttgart"),
        )
    }

    struct FixedRoute;

    #[async_trait]
    impl RouteProvider for FixedRoute {
        async fn resolve(&self, _origin: &str, _destination: &str) -> Result<ResolvedRoute> {
            Ok(ResolvedRoute {
                duration_text: "10 mins".to_string(),
                distance_text: "5 km".to_string(),
                encoded_path: "xyz".to_string(),
            })
        }
    }

    #[test]
    fn test_route_validation_requires_name() {
        let mut route = valid_route();
        route.name = String::new();

        let errors = route.validate().unwrap_err();
        assert!(errors.has_errors("name"));
    }

    #[test]
    fn test_route_validation_requires_destination_name() {
        let mut route = valid_route();
        route.destination = Some(Place::new(""));
        let errors = route.validate().unwrap_err();
        assert!(errors.has_errors("destination.name"));

        route.destination = None;
        let errors = route.validate().unwrap_err();
        assert!(errors.has_errors("destination"));
    }

    #[test]
    fn test_route_origin_is_optional_at_creation() {
        let mut route = valid_route();
        route.origin = None;
        assert!(route.validate().is_ok());
    }

    #[test]
    fn test_route_serializes_camel_case() {
        let mut route = valid_route();
        route.consuming_time = Some("10 mins".to_string());

        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["consumingTime"], "10 mins");
        assert_eq!(json["destination"]["name"], "Stuttgart");
        // Unset enrichment fields stay off the wire.
        assert!(json.get("distance").is_none());
    }

    #[tokio::test]
    async fn test_enricher_fills_provider_fields() {
        let enricher = RouteEnricher::new(Arc::new(FixedRoute));
        let enrichment = enricher.enrich(valid_route()).await.unwrap();

        assert_eq!(enrichment.payload.consuming_time.as_deref(), Some("10 mins"));
        assert_eq!(enrichment.payload.distance.as_deref(), Some("5 km"));
        assert_eq!(enrichment.payload.path.as_deref(), Some("xyz"));
        assert_eq!(
            enrichment.changed_fields,
            ["consumingTime", "distance", "path"]
        );
    }

    #[tokio::test]
    async fn test_enricher_rejects_route_without_origin() {
        let enricher = RouteEnricher::new(Arc::new(FixedRoute));
        let mut route = valid_route();
        route.origin = None;

        let error = enricher.enrich(route).await.unwrap_err();
        assert_eq!(error.code(), crate::ErrorCode::MissingRequiredField);
    }
}
