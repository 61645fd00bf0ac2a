use tracing::debug;

use crate::catalog::Catalog;
use crate::normalize::slug_variants;
use crate::settings::Settings;

/// Finds the catalog product page for a free-text medication name.
pub struct ProductResolver<'a, C: ?Sized> {
    catalog: &'a C,
    settings: &'a Settings,
}

impl<'a, C: Catalog + ?Sized> ProductResolver<'a, C> {
    pub fn new(catalog: &'a C, settings: &'a Settings) -> Self {
        Self { catalog, settings }
    }

    /// Probe each slug candidate in order; first live product page wins.
    pub async fn resolve(&self, name: &str) -> Option<String> {
        for slug in slug_variants(name) {
            let url = self.settings.products_url(&slug);
            if self.catalog.exists(&url).await {
                debug!("{:?} -> {}", name, url);
                return Some(url);
            }
            debug!("{:?}: no product at {}", name, url);
        }
        None
    }
}
