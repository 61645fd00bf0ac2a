use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{Catalog, FetchError};
use crate::matcher::select_best;
use crate::model::{
    BatchResult, ExtractionResult, MedicationQuery, ResolutionOutcome, ScoredVariant,
};
use crate::parser::{extract_spc, extract_variants};
use crate::resolver::ProductResolver;
use crate::settings::Settings;

/// Why a query ended without an extraction. The display text is the
/// failure reason recorded in the outcome.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Product not found on catalog")]
    NotFound,
    #[error("No variants found")]
    NoVariants,
    #[error("No suitable variant found")]
    NoSuitableVariant,
    #[error("Network error: {0}")]
    Transport(#[from] FetchError),
}

struct Resolved {
    product_url: String,
    variant: ScoredVariant,
    extraction: ExtractionResult,
}

/// Runs queries through resolve → variants → match → extract, one at a time.
pub struct Pipeline<C> {
    catalog: C,
    settings: Settings,
}

impl<C: Catalog> Pipeline<C> {
    pub fn new(catalog: C, settings: Settings) -> Self {
        Self { catalog, settings }
    }

    async fn try_resolve(&self, name: &str) -> Result<Resolved, ResolveError> {
        let product_url = ProductResolver::new(&self.catalog, &self.settings)
            .resolve(name)
            .await
            .ok_or(ResolveError::NotFound)?;

        let product_page = self.catalog.fetch(&product_url).await?;
        let variants = extract_variants(&product_page, &self.settings.catalog_base);
        if variants.is_empty() {
            return Err(ResolveError::NoVariants);
        }

        let variant = select_best(&variants, name).ok_or(ResolveError::NoSuitableVariant)?;

        let spc_page = self.catalog.fetch(&variant.link.url).await?;
        let extraction = extract_spc(&spc_page);

        Ok(Resolved {
            product_url,
            variant,
            extraction,
        })
    }

    /// Resolve one query. Never fails; failures become `found = false`.
    pub async fn resolve_one(&self, query: MedicationQuery) -> ResolutionOutcome {
        match self.try_resolve(&query.name).await {
            Ok(r) => {
                info!(
                    "{}: {} match {:?} (score {})",
                    query.name,
                    if r.variant.is_exact_match { "exact" } else { "approximate" },
                    r.variant.link.display_name,
                    r.variant.score
                );
                ResolutionOutcome::success(query, r.product_url, r.variant, r.extraction)
            }
            Err(e) => {
                warn!("{}: {}", query.name, e);
                ResolutionOutcome::failure(query, e.to_string())
            }
        }
    }

    /// Resolve a batch in input order, pausing between queries.
    /// `on_outcome` sees each outcome as soon as it is produced.
    pub async fn run_batch<F>(&self, queries: Vec<MedicationQuery>, mut on_outcome: F) -> BatchResult
    where
        F: FnMut(&ResolutionOutcome),
    {
        let delay = self.settings.batch_delay().unwrap_or_else(|e| {
            warn!("{e:#}; not pausing between queries");
            Duration::ZERO
        });
        let total = queries.len();
        let mut batch = BatchResult::default();

        for (i, query) in queries.into_iter().enumerate() {
            let outcome = self.resolve_one(query).await;
            on_outcome(&outcome);
            batch.push(outcome);

            if i + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        info!(
            "Batch done: {} queries ({} ok, {} failed)",
            total,
            total - batch.failures.len(),
            batch.failures.len()
        );
        batch
    }
}
