//! Venue Availability Library
//!
//! Decides whether a venue is open, whether a free-drink promotion is
//! running, when the next one starts, and whether the daily redemption
//! cap still allows showing it. Evaluators are pure functions over a
//! venue snapshot and an explicit local time.

pub mod api;
pub mod caps;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod model;
pub mod promotion;
pub mod report;
pub mod schedule;
pub mod source;
pub mod traits;

// Re-export commonly used types
pub use api::VenueApiClient;
pub use caps::{CapUsage, calculate_cap_usage, can_show_free_drink, exhaust_action};
pub use config::AppConfig;
pub use context::AppContext;
pub use error::AvailabilityError;
pub use format::{format_currency, format_date, format_date_time, format_time};
pub use model::{
    BusinessHours, Caps, DayHours, FreeDrinkWindow, OnExhaust, SpecialDate, TimeOfDay, Venue,
    VenueSnapshot,
};
pub use promotion::{
    ActiveFreeDrinkStatus, get_active_free_drink_status, get_next_active_window,
    is_window_active, next_window_occurrence, time_until_next_window,
};
pub use report::VenueStatus;
pub use schedule::{get_closing_time_today, is_venue_open_now, iso_weekday, weekday_name};
pub use source::FileVenueSource;
pub use traits::{Clock, MockClock, MockVenueSource, SystemClock, VenueSource};
