use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::{
    config::AppConfig,
    report::VenueStatus,
    traits::{Clock, VenueSource},
};

/// Application state shared by the CLI commands.
///
/// Holds what the dashboard used to keep in process-wide singletons:
/// configuration, the time source and where venue data comes from.
#[derive(Debug, Clone)]
pub struct AppContext<S, C> {
    pub config: Arc<AppConfig>,
    source: S,
    clock: C,
}

impl<S: VenueSource, C: Clock> AppContext<S, C> {
    pub fn new(config: Arc<AppConfig>, source: S, clock: C) -> Self {
        Self {
            config,
            source,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Fetch a fresh snapshot and evaluate it at the clock's current time.
    pub async fn status(&self, venue_id: &str) -> Result<VenueStatus> {
        let now = self.clock.now();
        self.status_at(venue_id, now, None).await
    }

    /// Evaluate at an explicit time, optionally overriding today's
    /// redemption count.
    pub async fn status_at(
        &self,
        venue_id: &str,
        now: chrono::NaiveDateTime,
        redemptions_override: Option<u32>,
    ) -> Result<VenueStatus> {
        let mut snapshot = self
            .source
            .fetch_snapshot(venue_id, now.date())
            .await
            .with_context(|| format!("Failed to load venue {venue_id}"))?;

        if let Some(count) = redemptions_override {
            snapshot.redemptions_today = count;
        }

        let status = VenueStatus::evaluate(&snapshot, now);
        tracing::debug!(
            venue_id = %status.venue_id,
            is_open = status.is_open,
            free_drink = status.free_drink.is_active,
            can_show = status.can_show_free_drink,
            "Evaluated venue"
        );
        Ok(status)
    }
}
