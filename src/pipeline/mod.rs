//! Single-name lookup pipeline.
//!
//! resolve → refresh → fetch → aggregate, failing fast on the first error.
//! Refreshing a report re-runs the whole pipeline; nothing is cached
//! between lookups.

use std::sync::Arc;

use tracing::info;

use crate::aggregate::aggregate;
use crate::client::StatsApi;
use crate::error::StatsError;
use crate::models::{HeroCatalog, Report};

/// Runs lookups against a [`StatsApi`] with a shared hero catalog.
#[derive(Clone)]
pub struct LookupPipeline {
    api: Arc<dyn StatsApi>,
    catalog: Arc<HeroCatalog>,
}

impl LookupPipeline {
    pub fn new(api: Arc<dyn StatsApi>, catalog: Arc<HeroCatalog>) -> Self {
        Self { api, catalog }
    }

    pub fn catalog(&self) -> &HeroCatalog {
        &self.catalog
    }

    /// Look up one player and build their report.
    pub async fn lookup(&self, name: &str) -> Result<Report, StatsError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StatsError::not_found(name, "empty player name"));
        }

        let player = self.api.resolve_id(name).await?;
        self.api.trigger_refresh(&player.remote_id).await?;
        let profile = self.api.fetch_profile(&player.remote_id).await?;

        let mut report = aggregate(profile.as_ref(), &self.catalog)?;
        if report.username.is_empty() {
            report.username = player.name;
        }

        info!(
            "Built report for {} ({}, {} ranked matches)",
            report.username, report.rank, report.overall_matches
        );
        Ok(report)
    }

    /// Rebuild a previously shown report from scratch.
    pub async fn refresh(&self, previous_username: &str) -> Result<Report, StatsError> {
        info!("Refreshing report for {}", previous_username);
        self.lookup(previous_username).await
    }
}
