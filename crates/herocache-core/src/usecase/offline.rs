//! Bulk download of the whole catalogue for offline use.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::catalog::HeroCatalog;
use crate::error::{Error, Result};

/// Default number of heroes whose children are fetched at once
pub const DEFAULT_PREFETCH_CONCURRENCY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchFailure {
    pub hero_id: String,
    pub error: Error,
}

/// Outcome of a prefetch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub heroes: usize,
    pub locations: usize,
    pub transformations: usize,
    pub failures: Vec<PrefetchFailure>,
}

impl PrefetchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load every hero, then the locations and transformations of each one with
/// at most `concurrency` heroes in flight. Per-hero failures are collected,
/// only a failure to list heroes aborts the run.
pub async fn prefetch_all(catalog: &HeroCatalog, concurrency: usize) -> Result<PrefetchReport> {
    let heroes = catalog.load_heroes(None).await?;
    info!(count = heroes.len(), concurrency, "Prefetching hero details for offline");

    let mut report = PrefetchReport {
        heroes: heroes.len(),
        ..Default::default()
    };

    let mut results = stream::iter(heroes)
        .map(|hero| async move {
            let locations = catalog.load_locations(&hero.id).await;
            let transformations = catalog.load_transformations(&hero.id).await;
            (hero.id, locations, transformations)
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((hero_id, locations, transformations)) = results.next().await {
        match locations {
            Ok(locations) => report.locations += locations.len(),
            Err(error) => {
                warn!(hero_id = %hero_id, error = %error, "Failed to prefetch locations");
                report.failures.push(PrefetchFailure {
                    hero_id: hero_id.clone(),
                    error,
                });
            }
        }
        match transformations {
            Ok(transformations) => report.transformations += transformations.len(),
            Err(error) => {
                warn!(hero_id = %hero_id, error = %error, "Failed to prefetch transformations");
                report.failures.push(PrefetchFailure { hero_id, error });
            }
        }
    }

    debug!(
        locations = report.locations,
        transformations = report.transformations,
        failures = report.failures.len(),
        "Prefetch complete"
    );
    Ok(report)
}
