//! Service-level composition of resource directories.
//!
//! A [`Service`] owns a set of named resources behind the object-safe
//! [`Resource`] trait, so directories of different payload types live side by
//! side. Purely compositional: every behavior of interest lives on the
//! directories themselves, reachable through
//! [`resource_as`](Service::resource_as).

use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::directory::ResourceDirectory;
use crate::error::{Result, SignpostError};
use crate::validation::Validate;

// ═══════════════════════════════════════════════════════════════════════════════
// Resource Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// A named, listable resource registered with a [`Service`].
pub trait Resource: Send + Sync + fmt::Debug {
    /// The resource's name.
    fn name(&self) -> &str;

    /// The resource's derived path.
    fn uri(&self) -> String;

    /// Number of elements currently held.
    fn len(&self) -> usize;

    /// Whether the resource holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether individual elements can be subscribed to.
    fn element_subscribable(&self) -> bool {
        true
    }

    /// Downcast support for typed access.
    fn as_any(&self) -> &dyn Any;
}

impl<T> Resource for ResourceDirectory<T>
where
    T: Validate + Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        ResourceDirectory::name(self)
    }

    fn uri(&self) -> String {
        ResourceDirectory::uri(self)
    }

    fn len(&self) -> usize {
        ResourceDirectory::len(self)
    }

    fn is_empty(&self) -> bool {
        ResourceDirectory::is_empty(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Service
// ═══════════════════════════════════════════════════════════════════════════════

/// A named set of resources.
///
/// Cheap to clone; clones share the same resource set.
#[derive(Clone)]
pub struct Service {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    id: Uuid,
    name: String,
    resources: RwLock<Vec<Arc<dyn Resource>>>,
}

impl Service {
    /// Create an empty service.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                id: Uuid::new_v4(),
                name: name.into(),
                resources: RwLock::new(Vec::new()),
            }),
        }
    }

    /// The service's identifier.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The service's name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The service's derived path.
    pub fn uri(&self) -> String {
        format!("/{}", self.inner.name.to_lowercase())
    }

    /// Register a resource under its own name. Names are matched
    /// case-insensitively and must be unique within the service.
    pub fn register(&self, resource: Arc<dyn Resource>) -> Result<()> {
        let mut resources = self.inner.resources.write();
        if resources
            .iter()
            .any(|r| r.name().eq_ignore_ascii_case(resource.name()))
        {
            return Err(SignpostError::already_registered(resource.name()));
        }

        info!(
            service = %self.inner.name,
            resource = %resource.name(),
            "Resource registered"
        );
        resources.push(resource);
        Ok(())
    }

    /// Look up a resource by name (case-insensitive).
    pub fn resource(&self, name: &str) -> Result<Arc<dyn Resource>> {
        self.inner
            .resources
            .read()
            .iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| SignpostError::resource_not_found(name))
    }

    /// Look up a resource by name with its concrete type restored.
    pub fn resource_as<R>(&self, name: &str) -> Result<R>
    where
        R: Resource + Clone + 'static,
    {
        let resource = self.resource(name)?;
        resource
            .as_any()
            .downcast_ref::<R>()
            .cloned()
            .ok_or_else(|| {
                SignpostError::internal(format!(
                    "Resource {} is not of the requested type",
                    name
                ))
            })
    }

    /// All registered resources, in registration order.
    pub fn resources(&self) -> Vec<Arc<dyn Resource>> {
        self.inner.resources.read().clone()
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.inner.resources.read().len()
    }

    /// Whether the service has no resources.
    pub fn is_empty(&self) -> bool {
        self.inner.resources.read().is_empty()
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("resources", &self.inner.resources.read().len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Service Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// The outermost composition layer: named services, each owning its
/// resources.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: RwLock<Vec<Service>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under its own name (case-insensitive, unique).
    pub fn register(&self, service: Service) -> Result<()> {
        let mut services = self.services.write();
        if services
            .iter()
            .any(|s| s.name().eq_ignore_ascii_case(service.name()))
        {
            return Err(SignpostError::already_registered(service.name()));
        }

        info!(service = %service.name(), "Service registered");
        services.push(service);
        Ok(())
    }

    /// Look up a service by name (case-insensitive).
    pub fn service(&self, name: &str) -> Result<Service> {
        self.services
            .read()
            .iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| SignpostError::resource_not_found(name))
    }

    /// All registered services, in registration order.
    pub fn services(&self) -> Vec<Service> {
        self.services.read().clone()
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    /// Whether the registry has no services.
    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
