//! Asynchronous post-creation enrichment.
//!
//! An [`EnrichmentPipeline`] decouples slow or unreliable external calls from
//! the synchronous create path: for every created element it spawns one task
//! that invokes the configured [`Enricher`] and, on success, publishes the
//! enriched payload as a single new version on the element's channel. On
//! failure (including timeout) the element keeps its pre-enrichment payload
//! permanently; the create caller already has its result and is never told.
//!
//! Spawned tasks are tracked so [`shutdown`](EnrichmentPipeline::shutdown)
//! can await quiescence, and outcomes are counted for the side channel
//! (logs + metrics) through which enrichment failures are observable.

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::element::Element;
use crate::error::{Result, SignpostError};

// ═══════════════════════════════════════════════════════════════════════════════
// Enricher Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// The outcome of a successful enrichment: the full replacement payload and
/// the serialized names of the fields it touched.
#[derive(Debug, Clone)]
pub struct Enrichment<T> {
    pub payload: T,
    pub changed_fields: Vec<String>,
}

/// Domain-specific mapping from an element's payload to an external
/// capability call and back.
#[async_trait]
pub trait Enricher<T>: Send + Sync {
    /// Enrich `current`, returning the replacement payload and touched
    /// fields.
    async fn enrich(&self, current: T) -> Result<Enrichment<T>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for the enrichment pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Timeout applied to each enrichment attempt.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// Attempts per element. The default is a single attempt; raising it
    /// enables bounded retry for transient provider failures.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts when retry is enabled.
    #[serde(with = "humantime_serde", default = "default_retry_backoff")]
    pub retry_backoff: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_attempts: default_max_attempts(),
            retry_backoff: default_retry_backoff(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_attempts() -> u32 {
    1
}

fn default_retry_backoff() -> Duration {
    Duration::from_millis(500)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Statistics
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome counters for a pipeline.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentStats {
    started: Arc<AtomicU64>,
    succeeded: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl EnrichmentStats {
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Enrichment Pipeline
// ═══════════════════════════════════════════════════════════════════════════════

/// Fire-and-forget post-creation processor bound to a directory.
///
/// Cheap to clone; clones share the enricher, tracker and counters, so a
/// handle kept outside the directory can await or inspect the pipeline.
pub struct EnrichmentPipeline<T> {
    enricher: Arc<dyn Enricher<T>>,
    config: EnrichmentConfig,
    tracker: TaskTracker,
    stats: EnrichmentStats,
}

impl<T> EnrichmentPipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a pipeline with default configuration.
    pub fn new(enricher: Arc<dyn Enricher<T>>) -> Self {
        Self::with_config(enricher, EnrichmentConfig::default())
    }

    /// Create a pipeline with explicit configuration.
    pub fn with_config(enricher: Arc<dyn Enricher<T>>, config: EnrichmentConfig) -> Self {
        Self {
            enricher,
            config,
            tracker: TaskTracker::new(),
            stats: EnrichmentStats::default(),
        }
    }

    /// Spawn the enrichment task for a newly created element.
    ///
    /// Called exactly once per element, after the create call's effects are
    /// visible. Must run within a tokio runtime.
    pub fn spawn(&self, element: Element<T>) {
        let pipeline = self.clone();
        self.tracker.spawn(async move {
            pipeline.run(element).await;
        });
    }

    /// Outcome counters.
    pub fn stats(&self) -> &EnrichmentStats {
        &self.stats
    }

    /// Number of enrichment tasks not yet finished.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting completion tracking and wait for every in-flight
    /// enrichment task to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    async fn run(&self, element: Element<T>) {
        self.stats.started.fetch_add(1, Ordering::Relaxed);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let current = element.payload();
            let outcome =
                tokio::time::timeout(self.config.timeout, self.enricher.enrich(current)).await;

            let error = match outcome {
                Ok(Ok(enrichment)) => {
                    element.publish_version(enrichment.payload, enrichment.changed_fields);
                    self.stats.succeeded.fetch_add(1, Ordering::Relaxed);
                    counter!("signpost_enrichment_total", "outcome" => "success").increment(1);
                    debug!(element = %element.id(), attempt, "Element enriched");
                    return;
                }
                Ok(Err(error)) => error,
                Err(_) => SignpostError::provider_timeout(self.config.timeout),
            };

            if attempt >= self.config.max_attempts {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                counter!("signpost_enrichment_total", "outcome" => "failure").increment(1);
                warn!(
                    element = %element.id(),
                    error = %error,
                    attempts = attempt,
                    "Enrichment failed; element keeps its pre-enrichment payload"
                );
                return;
            }

            debug!(
                element = %element.id(),
                error = %error,
                attempt,
                "Enrichment attempt failed, retrying"
            );
            tokio::time::sleep(self.config.retry_backoff).await;
        }
    }
}

impl<T> Clone for EnrichmentPipeline<T> {
    fn clone(&self) -> Self {
        Self {
            enricher: Arc::clone(&self.enricher),
            config: self.config.clone(),
            tracker: self.tracker.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<T> std::fmt::Debug for EnrichmentPipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentPipeline")
            .field("config", &self.config)
            .field("pending", &self.tracker.len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
