use thiserror::Error;

/// Typed failures raised while reading venue data.
///
/// The evaluators themselves never fail; these only surface at the
/// parsing and fetching boundaries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("invalid time of day {0:?}, expected zero-padded HH:MM")]
    InvalidTime(String),

    #[error("invalid weekday {0}, expected 1 (Monday) through 7 (Sunday)")]
    InvalidWeekday(u8),

    #[error("venue {0} not found")]
    VenueNotFound(String),

    #[error("redemption count missing from response: {0}")]
    MissingCount(String),
}
