//! Route planning: the domain instantiation of the generic directory core.
//!
//! One service, two directories: `routes` (created by clients, enriched
//! asynchronously through a [`RouteProvider`](crate::provider::RouteProvider))
//! and `routepolicies` (seeded at construction, never enriched).

mod policies;
mod routes;

pub use policies::{policies_directory, PolicyPayload};
pub use routes::{routes_directory, Place, RouteEnricher, RoutePayload};

use std::sync::Arc;

use crate::enrichment::EnrichmentConfig;
use crate::error::Result;
use crate::provider::RouteProvider;
use crate::registry::Service;

/// Name of the route planning service.
pub const SERVICE_NAME: &str = "routeplanning";

/// Name of the routes directory.
pub const ROUTES: &str = "routes";

/// Name of the route policies directory.
pub const ROUTE_POLICIES: &str = "routepolicies";

/// Assemble the route planning service: a routes directory wired to the
/// given provider, plus the seeded policies directory.
pub fn route_planning_service(
    provider: Arc<dyn RouteProvider>,
    enrichment: &EnrichmentConfig,
) -> Result<Service> {
    let service = Service::new(SERVICE_NAME);
    service.register(Arc::new(routes_directory(provider, enrichment)))?;
    service.register(Arc::new(policies_directory()?))?;
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::ResourceDirectory;
    use crate::provider::ResolvedRoute;
    use async_trait::async_trait;

    struct NoRoutes;

    #[async_trait]
    impl RouteProvider for NoRoutes {
        async fn resolve(&self, _origin: &str, _destination: &str) -> Result<ResolvedRoute> {
            Err(crate::SignpostError::provider("no route"))
        }
    }

    #[tokio::test]
    async fn test_service_composition() {
        let service =
            route_planning_service(Arc::new(NoRoutes), &EnrichmentConfig::default()).unwrap();

        assert_eq!(service.name(), SERVICE_NAME);
        assert_eq!(service.len(), 2);

        let routes: ResourceDirectory<RoutePayload> = service.resource_as(ROUTES).unwrap();
        assert!(routes.is_empty());

        let policies: ResourceDirectory<PolicyPayload> =
            service.resource_as(ROUTE_POLICIES).unwrap();
        assert_eq!(policies.len(), 2);
    }
}
