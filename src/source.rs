use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::{
    error::AvailabilityError,
    model::{Venue, VenueSnapshot},
    traits::VenueSource,
};

/// Venue data read from a JSON file on disk.
///
/// The file may hold a full snapshot (`{ "venue": ..., "redemptions_today": n }`)
/// or just a venue, in which case no redemptions are assumed.
#[derive(Debug, Clone)]
pub struct FileVenueSource {
    path: PathBuf,
}

impl FileVenueSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<VenueSnapshot> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read venue file {}", self.path.display()))?;

        let value: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse venue file {}", self.path.display()))?;

        // Pick the shape up front so field errors are reported as-is
        let snapshot = if value.get("venue").is_some() {
            serde_json::from_value(value)
        } else {
            serde_json::from_value::<Venue>(value).map(|venue| VenueSnapshot {
                venue,
                redemptions_today: 0,
            })
        };

        snapshot.with_context(|| format!("Invalid venue data in {}", self.path.display()))
    }
}

impl VenueSource for FileVenueSource {
    async fn fetch_snapshot(&self, venue_id: &str, _today: NaiveDate) -> Result<VenueSnapshot> {
        let snapshot = self.load()?;
        if !venue_id.is_empty() && snapshot.venue.id != venue_id {
            return Err(AvailabilityError::VenueNotFound(venue_id.to_string()).into());
        }
        Ok(snapshot)
    }
}
