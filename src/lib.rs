#![allow(clippy::result_large_err)]
//! # Signpost Core
//!
//! In-memory observable resource directories with asynchronous element
//! enrichment.
//!
//! ## Architecture
//!
//! - **ChangeChannel**: replay-latest broadcast primitive; new subscribers
//!   immediately receive the most recent value, then every later publish
//! - **Element**: versioned value container with immutable identity,
//!   observable through its own channel
//! - **ResourceDirectory**: ordered element collection with create, lookup,
//!   slice-style pagination and directory-level structural events
//! - **EnrichmentPipeline**: fire-and-forget post-creation mutation through
//!   an external capability, with timeout, optional bounded retry, and
//!   tracked shutdown
//! - **Service**: compositional registry of named resource directories
//! - **Planning**: route-planning domain instantiation (routes enriched via a
//!   directions provider, seeded route policies)
//! - **Validation**: declarative payload validation checked at the directory
//!   boundary
//! - **Observability**: structured logging and metrics infrastructure

pub mod channel;
pub mod config;
pub mod directory;
pub mod element;
pub mod enrichment;
pub mod error;
pub mod observability;
pub mod planning;
pub mod provider;
pub mod registry;
pub mod validation;

pub use error::{ErrorCode, ErrorContext, ErrorSeverity, Result, SignpostError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::channel::{ChangeChannel, Subscription};
    pub use crate::config::Config;
    pub use crate::directory::{
        ChangeAction, DirectoryBuilder, DirectoryEvent, ListRange, ResourceDirectory,
    };
    pub use crate::element::{Element, ElementId, IdGenerator, UuidGenerator, Versioned};
    pub use crate::enrichment::{
        Enricher, Enrichment, EnrichmentConfig, EnrichmentPipeline, EnrichmentStats,
    };
    pub use crate::error::{ErrorCode, ErrorContext, ErrorSeverity, Result, SignpostError};
    pub use crate::provider::{DirectionsClient, ResolvedRoute, RouteProvider};
    pub use crate::registry::{Resource, Service, ServiceRegistry};
    pub use crate::validation::{Validate, ValidationErrors, ValidationResult};
}
