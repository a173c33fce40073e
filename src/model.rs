//! Venue data as stored by the backend.
//!
//! JSON field names follow the stored representation: weekday-keyed
//! `byDay` objects with string keys `"1"`..`"7"` and zero-padded `HH:MM`
//! time strings.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AvailabilityError;

/// Backend rows may carry explicit `null`s for columns that have a default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ==================== Time of Day ====================

/// Wall-clock time with minute resolution.
///
/// Ordering is hour-then-minute, which matches lexicographic ordering of
/// the zero-padded `HH:MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, AvailabilityError> {
        if hour > 23 || minute > 59 {
            return Err(AvailabilityError::InvalidTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Truncates seconds, so 17:00:45 compares equal to 17:00.
    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn to_naive(self) -> NaiveTime {
        // hour and minute are range-checked on construction
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for TimeOfDay {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AvailabilityError::InvalidTime(s.to_string());

        // Postgres `time` columns come back as HH:MM:SS
        let hm = match s.len() {
            5 => s,
            8 if s.as_bytes()[5] == b':' && s.as_bytes()[6..].iter().all(u8::is_ascii_digit) => {
                &s[..5]
            }
            _ => return Err(invalid()),
        };

        let bytes = hm.as_bytes();
        if bytes[2] != b':' || !bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let hour = hm[..2].parse::<u8>().map_err(|_| invalid())?;
        let minute = hm[3..].parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = AvailabilityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

// ==================== Business Hours ====================

/// Opening bounds for a single day. A missing bound means closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(default)]
    pub open: Option<TimeOfDay>,
    #[serde(default)]
    pub close: Option<TimeOfDay>,
}

impl DayHours {
    pub fn new(open: TimeOfDay, close: TimeOfDay) -> Self {
        Self {
            open: Some(open),
            close: Some(close),
        }
    }

    pub fn closed() -> Self {
        Self::default()
    }
}

/// Override of the weekly hours for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDate {
    pub date: NaiveDate,
    #[serde(default)]
    pub open: Option<TimeOfDay>,
    #[serde(default)]
    pub close: Option<TimeOfDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBusinessHours")]
pub struct BusinessHours {
    /// Keyed by Monday-based weekday, 1 (Monday) through 7 (Sunday).
    pub by_day: BTreeMap<u8, DayHours>,
    pub special_dates: Vec<SpecialDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBusinessHours {
    #[serde(default, deserialize_with = "null_as_default")]
    by_day: BTreeMap<u8, Option<DayHours>>,
    #[serde(default, deserialize_with = "null_as_default")]
    special_dates: Vec<SpecialDate>,
}

impl TryFrom<RawBusinessHours> for BusinessHours {
    type Error = AvailabilityError;

    fn try_from(raw: RawBusinessHours) -> Result<Self, Self::Error> {
        if let Some(&day) = raw.by_day.keys().find(|d| !(1..=7).contains(*d)) {
            return Err(AvailabilityError::InvalidWeekday(day));
        }

        Ok(Self {
            by_day: raw
                .by_day
                .into_iter()
                .map(|(day, hours)| (day, hours.unwrap_or_default()))
                .collect(),
            special_dates: raw.special_dates,
        })
    }
}

impl BusinessHours {
    /// Set the hours for a weekday (1=Monday, 7=Sunday).
    pub fn with_day(mut self, weekday: u8, hours: DayHours) -> Result<Self, AvailabilityError> {
        if !(1..=7).contains(&weekday) {
            return Err(AvailabilityError::InvalidWeekday(weekday));
        }
        self.by_day.insert(weekday, hours);
        Ok(self)
    }

    pub fn with_special_date(mut self, special: SpecialDate) -> Self {
        self.special_dates.push(special);
        self
    }
}

// ==================== Free-Drink Windows ====================

/// Recurring weekly slot during which one drink is free at one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeDrinkWindow {
    pub id: String,
    pub venue_id: String,
    pub drink_id: String,
    /// Monday-based weekdays, 1 (Monday) through 7 (Sunday).
    pub days: Vec<u8>,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// IANA zone name. Stored for display only; evaluation uses the
    /// caller's local wall clock.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timezone: String,
}

impl FreeDrinkWindow {
    pub fn runs_on(&self, weekday: u8) -> bool {
        self.days.contains(&weekday)
    }
}

// ==================== Caps ====================

/// What the venue wants shown once the daily cap is used up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnExhaust {
    #[default]
    Close,
    ShowAltOffer,
    DoNothing,
}

impl OnExhaust {
    pub fn description(&self) -> &'static str {
        match self {
            OnExhaust::Close => "hide free drink",
            OnExhaust::ShowAltOffer => "show alternative offer",
            OnExhaust::DoNothing => "keep showing",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caps {
    #[serde(default)]
    pub daily: Option<u32>,
    #[serde(default)]
    pub hourly: Option<u32>,
    #[serde(default)]
    pub monthly: Option<u32>,
    #[serde(default)]
    pub per_user_daily: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub on_exhaust: OnExhaust,
    #[serde(default)]
    pub alt_offer_text: Option<String>,
}

impl Caps {
    /// Daily cap, treating zero as "not configured".
    pub fn daily_limit(&self) -> Option<u32> {
        self.daily.filter(|&limit| limit > 0)
    }
}

// ==================== Venue ====================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_paused: bool,
    #[serde(default)]
    pub business_hours: Option<BusinessHours>,
    #[serde(default, rename = "freeDrinkWindows")]
    pub free_drink_windows: Option<Vec<FreeDrinkWindow>>,
    #[serde(default)]
    pub caps: Option<Caps>,
}

impl Venue {
    pub fn windows(&self) -> &[FreeDrinkWindow] {
        self.free_drink_windows.as_deref().unwrap_or_default()
    }
}

/// A venue together with the number of redemptions recorded today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSnapshot {
    pub venue: Venue,
    #[serde(default, deserialize_with = "null_as_default")]
    pub redemptions_today: u32,
}
