use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_CATALOG_BASE: &str = "https://vetisearch.dk";
pub const DEFAULT_USER_AGENT: &str = "Educational Flashcard Generator (Educational project)";

/// Runtime knobs. Built-in defaults, then `VETSEARCH_*` environment
/// variables, then CLI flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog_base: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Pause between consecutive queries of a batch.
    pub delay_secs: f64,
    /// Total attempts for a GET answered with a 5xx.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_base: DEFAULT_CATALOG_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            delay_secs: 1.5,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_config(
            Config::builder()
                .add_source(Environment::with_prefix("VETSEARCH").try_parsing(true))
                .build()
                .context("Failed to read VETSEARCH_* settings")?,
        )
    }

    fn from_config(config: Config) -> Result<Self> {
        let mut settings: Settings = config
            .try_deserialize()
            .context("Invalid VETSEARCH_* settings")?;
        settings.catalog_base = settings.catalog_base.trim_end_matches('/').to_string();
        settings.batch_delay()?;
        Ok(settings)
    }

    /// Override the courtesy delay, rejecting values that are not a
    /// representable non-negative duration.
    pub fn set_delay_secs(&mut self, secs: f64) -> Result<()> {
        let previous = std::mem::replace(&mut self.delay_secs, secs);
        if let Err(e) = self.batch_delay() {
            self.delay_secs = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Result<Duration> {
        if self.delay_secs.is_sign_negative() && self.delay_secs != 0.0 {
            bail!("delay must not be negative, got {}", self.delay_secs);
        }
        Duration::try_from_secs_f64(self.delay_secs)
            .with_context(|| format!("delay of {} seconds is out of range", self.delay_secs))
    }

    pub fn products_url(&self, slug: &str) -> String {
        format!("{}/products/{}", self.catalog_base, slug)
    }
}
