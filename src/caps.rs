use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    model::{OnExhaust, Venue},
    promotion::get_active_free_drink_status,
};

/// Daily cap consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapUsage {
    pub used: u32,
    pub limit: u32,
    /// `used / limit * 100`, or 0 when no limit is set.
    pub pct: f64,
}

impl CapUsage {
    pub fn is_exhausted(&self) -> bool {
        self.limit > 0 && self.used >= self.limit
    }
}

pub fn calculate_cap_usage(venue: &Venue, redemptions_today: u32) -> CapUsage {
    let limit = venue.caps.as_ref().and_then(|c| c.daily).unwrap_or(0);
    let pct = if limit > 0 {
        redemptions_today as f64 / limit as f64 * 100.0
    } else {
        0.0
    };

    CapUsage {
        used: redemptions_today,
        limit,
        pct,
    }
}

/// Decide whether the default free-drink offer should be shown.
///
/// Reaching the daily cap counts as exhausted. `on_exhaust` is not
/// consulted here; see [`exhaust_action`].
pub fn can_show_free_drink(venue: &Venue, now: &NaiveDateTime, redemptions_today: u32) -> bool {
    if venue.is_paused {
        return false;
    }

    if !get_active_free_drink_status(venue, now).is_active {
        return false;
    }

    !calculate_cap_usage(venue, redemptions_today).is_exhausted()
}

/// The venue's configured exhaust policy, once the daily cap is used up.
pub fn exhaust_action(venue: &Venue, redemptions_today: u32) -> Option<OnExhaust> {
    let caps = venue.caps.as_ref()?;
    calculate_cap_usage(venue, redemptions_today)
        .is_exhausted()
        .then_some(caps.on_exhaust)
}
