//! One evaluation of a venue at a point in time, ready for display.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::{
    caps::{CapUsage, calculate_cap_usage, can_show_free_drink, exhaust_action},
    format::{format_date_time, format_time},
    model::{FreeDrinkWindow, OnExhaust, TimeOfDay, VenueSnapshot},
    promotion::{ActiveFreeDrinkStatus, get_active_free_drink_status, next_window_occurrence},
    schedule::{get_closing_time_today, is_venue_open_now, iso_weekday, weekday_name},
};

/// Everything the dashboard shows about a venue's free-drink state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueStatus {
    pub venue_id: String,
    pub venue_name: String,
    pub evaluated_at: NaiveDateTime,
    pub is_paused: bool,
    pub is_open: bool,
    pub closes_at: Option<TimeOfDay>,
    pub free_drink: ActiveFreeDrinkStatus,
    pub next_window: Option<FreeDrinkWindow>,
    pub next_window_starts_at: Option<NaiveDateTime>,
    pub cap_usage: CapUsage,
    pub can_show_free_drink: bool,
    /// Set only when the daily cap is used up.
    pub exhausted_action: Option<OnExhaust>,
    pub alt_offer_text: Option<String>,
}

impl VenueStatus {
    pub fn evaluate(snapshot: &VenueSnapshot, now: NaiveDateTime) -> Self {
        let venue = &snapshot.venue;
        let used = snapshot.redemptions_today;
        let next = next_window_occurrence(venue, &now);
        let exhausted_action = exhaust_action(venue, used);

        let alt_offer_text = match exhausted_action {
            Some(OnExhaust::ShowAltOffer) => {
                venue.caps.as_ref().and_then(|c| c.alt_offer_text.clone())
            }
            _ => None,
        };

        Self {
            venue_id: venue.id.clone(),
            venue_name: venue.name.clone(),
            evaluated_at: now,
            is_paused: venue.is_paused,
            is_open: is_venue_open_now(venue, &now),
            closes_at: get_closing_time_today(venue, &now),
            free_drink: get_active_free_drink_status(venue, &now),
            next_window: next.map(|(w, _)| w.clone()),
            next_window_starts_at: next.map(|(_, starts_at)| starts_at),
            cap_usage: calculate_cap_usage(venue, used),
            can_show_free_drink: can_show_free_drink(venue, &now, used),
            exhausted_action,
            alt_offer_text,
        }
    }

    pub fn next_window_starts_in(&self) -> Option<Duration> {
        self.next_window_starts_at
            .map(|starts_at| starts_at - self.evaluated_at)
    }

    /// Human-readable lines for the terminal.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();

        let title = if self.venue_name.is_empty() {
            self.venue_id.clone()
        } else {
            format!("{} ({})", self.venue_name, self.venue_id)
        };
        lines.push(format!("{title} at {}", format_date_time(self.evaluated_at)));

        if self.is_paused {
            lines.push("Free drinks paused".to_string());
        }

        lines.push(match (self.is_open, self.closes_at) {
            (true, Some(close)) => format!("Open, closes at {}", format_time(&close)),
            (true, None) => "Open".to_string(),
            (false, _) => "Closed".to_string(),
        });

        if let Some(window) = &self.free_drink.current_window {
            lines.push(format!(
                "Free drink active: {} until {}",
                window.drink_id,
                format_time(&window.end)
            ));
        } else if let (Some(window), Some(starts_in)) =
            (&self.next_window, self.next_window_starts_in())
        {
            let day = self
                .next_window_starts_at
                .map(|s| weekday_name(iso_weekday(s.date())))
                .unwrap_or("Unknown");
            lines.push(format!(
                "Next free drink: {} on {} at {} (in {}h {:02}m)",
                window.drink_id,
                day,
                format_time(&window.start),
                starts_in.num_hours(),
                starts_in.num_minutes() % 60
            ));
        } else {
            lines.push("No free drink scheduled".to_string());
        }

        if self.cap_usage.limit > 0 {
            lines.push(format!(
                "Daily cap: {}/{} ({:.0}%)",
                self.cap_usage.used, self.cap_usage.limit, self.cap_usage.pct
            ));
        }

        if let Some(action) = self.exhausted_action {
            let mut line = format!("Cap reached: {}", action.description());
            if let Some(text) = &self.alt_offer_text {
                line.push_str(&format!(" \"{text}\""));
            }
            lines.push(line);
        }

        lines
    }

    /// Describe what changed since a previous evaluation of the same venue.
    pub fn transition_from(&self, previous: &VenueStatus) -> Vec<String> {
        let mut changes = Vec::new();

        if self.is_open != previous.is_open {
            changes.push(if self.is_open { "Venue opened" } else { "Venue closed" }.to_string());
        }

        if self.is_paused != previous.is_paused {
            changes.push(
                if self.is_paused {
                    "Free drinks paused"
                } else {
                    "Free drinks resumed"
                }
                .to_string(),
            );
        }

        let current_id = self.free_drink.current_window.as_ref().map(|w| w.id.as_str());
        let previous_id = previous.free_drink.current_window.as_ref().map(|w| w.id.as_str());
        if current_id != previous_id {
            match (previous_id, current_id) {
                (_, Some(id)) => changes.push(format!("Free drink window {id} started")),
                (Some(id), None) => changes.push(format!("Free drink window {id} ended")),
                (None, None) => {}
            }
        }

        if self.exhausted_action.is_some() && previous.exhausted_action.is_none() {
            changes.push("Daily cap reached".to_string());
        } else if self.exhausted_action.is_none() && previous.exhausted_action.is_some() {
            changes.push("Daily cap reset".to_string());
        }

        changes
    }
}
