use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::model::{BusinessHours, DayHours, TimeOfDay, Venue};

/// Monday-based weekday index of a date: 1 (Monday) through 7 (Sunday).
pub fn iso_weekday(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Get the weekday name from a Monday-based index (1=Monday).
pub fn weekday_name(weekday: u8) -> &'static str {
    match weekday {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "Unknown",
    }
}

impl BusinessHours {
    /// Resolve the opening bounds for a date.
    ///
    /// A special date for that day wins field by field; a field the
    /// special entry leaves out falls back to the weekday entry.
    pub fn hours_on(&self, date: NaiveDate) -> DayHours {
        let regular = self
            .by_day
            .get(&iso_weekday(date))
            .copied()
            .unwrap_or_default();

        match self.special_dates.iter().find(|s| s.date == date) {
            Some(special) => DayHours {
                open: special.open.or(regular.open),
                close: special.close.or(regular.close),
            },
            None => regular,
        }
    }

    /// Check whether the given local time falls inside the day's hours.
    ///
    /// Both bounds are inclusive. A range whose close is before its open
    /// (past midnight) never matches.
    pub fn is_open_at(&self, now: &NaiveDateTime) -> bool {
        let hours = self.hours_on(now.date());
        let (Some(open), Some(close)) = (hours.open, hours.close) else {
            return false;
        };

        let current = TimeOfDay::from_naive(now.time());
        open <= current && current <= close
    }
}

/// Check if the venue is open at `now`. Venues without hours are closed.
pub fn is_venue_open_now(venue: &Venue, now: &NaiveDateTime) -> bool {
    venue
        .business_hours
        .as_ref()
        .is_some_and(|hours| hours.is_open_at(now))
}

/// Get the resolved closing time for the day of `now`, if any.
pub fn get_closing_time_today(venue: &Venue, now: &NaiveDateTime) -> Option<TimeOfDay> {
    venue
        .business_hours
        .as_ref()
        .and_then(|hours| hours.hours_on(now.date()).close)
}
