//! External route resolution capability.
//!
//! The core consumes a single capability: given an origin and a destination
//! name, asynchronously return a best route (duration, distance, encoded
//! path) or fail. [`RouteProvider`] is that seam; [`DirectionsClient`] is the
//! HTTP implementation against a directions web API.

mod directions;

pub use directions::DirectionsClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A resolved best route between two named places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoute {
    /// Human-readable travel time, e.g. `"10 mins"`.
    pub duration_text: String,

    /// Human-readable distance, e.g. `"5 km"`.
    pub distance_text: String,

    /// Encoded polyline of the route geometry.
    pub encoded_path: String,
}

/// Asynchronous route resolution. One attempt per call; retry policy belongs
/// to the caller.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Resolve the best route from `origin` to `destination`, both plain
    /// place names.
    async fn resolve(&self, origin: &str, destination: &str) -> Result<ResolvedRoute>;
}
