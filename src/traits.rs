//! Abstractions for time and data access to enable testing.
//!
//! This module provides traits for:
//! - `Clock`: the venue-local wall clock, injected by callers
//! - `VenueSource`: loading a venue snapshot from wherever it lives

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::{error::AvailabilityError, model::VenueSnapshot};

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
///
/// Evaluators never read a clock themselves; the application shell asks
/// the clock once and passes the value down.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in the venue's local zone.
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// System clock implementation using the host's local time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Mock clock for testing with controllable time.
#[derive(Debug, Clone)]
pub struct MockClock {
    time: Arc<Mutex<NaiveDateTime>>,
}

impl MockClock {
    pub fn new(time: NaiveDateTime) -> Self {
        Self {
            time: Arc::new(Mutex::new(time)),
        }
    }

    pub fn set_time(&self, time: NaiveDateTime) {
        *self.time.lock().unwrap() = time;
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.time.lock().unwrap();
        *time += duration;
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self.time.lock().unwrap()
    }
}

// ==================== Venue Source Trait ====================

/// Loads a venue together with today's redemption count.
pub trait VenueSource: Send + Sync {
    fn fetch_snapshot(
        &self,
        venue_id: &str,
        today: NaiveDate,
    ) -> impl Future<Output = Result<VenueSnapshot>> + Send;
}

/// In-memory source for testing that counts fetches.
#[derive(Debug, Clone, Default)]
pub struct MockVenueSource {
    snapshots: Arc<Mutex<HashMap<String, VenueSnapshot>>>,
    fetches: Arc<Mutex<usize>>,
}

impl MockVenueSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot returned for its venue id.
    pub fn put(&self, snapshot: VenueSnapshot) {
        self.snapshots
            .lock()
            .unwrap()
            .insert(snapshot.venue.id.clone(), snapshot);
    }

    pub fn set_redemptions(&self, venue_id: &str, redemptions_today: u32) {
        if let Some(snapshot) = self.snapshots.lock().unwrap().get_mut(venue_id) {
            snapshot.redemptions_today = redemptions_today;
        }
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

impl VenueSource for MockVenueSource {
    async fn fetch_snapshot(&self, venue_id: &str, _today: NaiveDate) -> Result<VenueSnapshot> {
        *self.fetches.lock().unwrap() += 1;
        let snapshot = self
            .snapshots
            .lock()
            .unwrap()
            .get(venue_id)
            .cloned()
            .ok_or_else(|| AvailabilityError::VenueNotFound(venue_id.to_string()))?;
        Ok(snapshot)
    }
}
