//! Free-drink window evaluation.
//!
//! Windows repeat weekly on Monday-based weekdays. When several windows
//! match at once, the first one in storage order wins; there is no
//! priority field.

use chrono::{Days, Duration, NaiveDateTime};
use serde::Serialize;

use crate::{
    model::{FreeDrinkWindow, TimeOfDay, Venue},
    schedule::iso_weekday,
};

/// Whether a free drink is running right now, and which window provides it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveFreeDrinkStatus {
    pub is_active: bool,
    pub current_window: Option<FreeDrinkWindow>,
}

impl ActiveFreeDrinkStatus {
    fn inactive() -> Self {
        Self::default()
    }
}

/// Check whether `now` falls inside the window (inclusive at both ends).
///
/// Pause state and business hours are not consulted.
pub fn is_window_active(window: &FreeDrinkWindow, now: &NaiveDateTime) -> bool {
    if !window.runs_on(iso_weekday(now.date())) {
        return false;
    }

    let current = TimeOfDay::from_naive(now.time());
    window.start <= current && current <= window.end
}

pub fn get_active_free_drink_status(venue: &Venue, now: &NaiveDateTime) -> ActiveFreeDrinkStatus {
    if venue.is_paused {
        return ActiveFreeDrinkStatus::inactive();
    }

    match venue.windows().iter().find(|w| is_window_active(w, now)) {
        Some(window) => ActiveFreeDrinkStatus {
            is_active: true,
            current_window: Some(window.clone()),
        },
        None => ActiveFreeDrinkStatus::inactive(),
    }
}

/// Find the next window to start after `now`, looking at most one week
/// ahead.
pub fn get_next_active_window<'a>(
    venue: &'a Venue,
    now: &NaiveDateTime,
) -> Option<&'a FreeDrinkWindow> {
    next_window_occurrence(venue, now).map(|(window, _)| window)
}

/// Like [`get_next_active_window`], also returning the local date and
/// time at which that window starts.
///
/// Later today beats any future day. Otherwise the next day (up to seven
/// days out) that any window runs on is used, picking its earliest start.
pub fn next_window_occurrence<'a>(
    venue: &'a Venue,
    now: &NaiveDateTime,
) -> Option<(&'a FreeDrinkWindow, NaiveDateTime)> {
    let windows = venue.windows();
    if windows.is_empty() {
        return None;
    }

    let today = now.date();
    let current = TimeOfDay::from_naive(now.time());
    let weekday = iso_weekday(today);

    let later_today = earliest_start(
        windows
            .iter()
            .filter(|w| w.runs_on(weekday) && w.start > current),
    );
    if let Some(window) = later_today {
        return Some((window, today.and_time(window.start.to_naive())));
    }

    // Past the end of the calendar there is no next day to search
    (1..=7).find_map(|offset| {
        let date = today.checked_add_days(Days::new(offset))?;
        let weekday = iso_weekday(date);
        earliest_start(windows.iter().filter(|w| w.runs_on(weekday)))
            .map(|window| (window, date.and_time(window.start.to_naive())))
    })
}

/// Time remaining until the next window starts, if there is one.
pub fn time_until_next_window(venue: &Venue, now: &NaiveDateTime) -> Option<Duration> {
    next_window_occurrence(venue, now).map(|(_, starts_at)| starts_at - *now)
}

/// Earliest start; ties keep the first window in storage order.
fn earliest_start<'a>(
    windows: impl Iterator<Item = &'a FreeDrinkWindow>,
) -> Option<&'a FreeDrinkWindow> {
    windows.fold(None::<&'a FreeDrinkWindow>, |best, w| match best {
        Some(b) if b.start <= w.start => Some(b),
        _ => Some(w),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn window(id: &str, days: &[u8], start: &str, end: &str) -> FreeDrinkWindow {
        FreeDrinkWindow {
            id: id.into(),
            venue_id: "venue-1".into(),
            drink_id: format!("drink-{id}"),
            days: days.to_vec(),
            start: t(start),
            end: t(end),
            timezone: "Europe/Copenhagen".into(),
        }
    }

    fn venue(windows: Vec<FreeDrinkWindow>) -> Venue {
        Venue {
            id: "venue-1".into(),
            free_drink_windows: Some(windows),
            ..Default::default()
        }
    }

    // Reference week: 2024-02-12 (Mon) .. 2024-02-18 (Sun)

    // ==================== is_window_active Tests ====================

    #[test]
    fn test_weekend_window_active_on_saturday() {
        let w = window("w1", &[6, 7], "14:00", "16:00");
        assert!(is_window_active(&w, &at(2024, 2, 17, 15, 0)));
        assert!(is_window_active(&w, &at(2024, 2, 18, 15, 0)));
    }

    #[test]
    fn test_weekend_window_inactive_on_monday() {
        let w = window("w1", &[6, 7], "14:00", "16:00");
        assert!(!is_window_active(&w, &at(2024, 2, 12, 15, 0)));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let w = window("w1", &[6], "14:00", "16:00");
        assert!(is_window_active(&w, &at(2024, 2, 17, 14, 0)));
        assert!(is_window_active(&w, &at(2024, 2, 17, 16, 0)));
        assert!(!is_window_active(&w, &at(2024, 2, 17, 13, 59)));
        assert!(!is_window_active(&w, &at(2024, 2, 17, 16, 1)));
    }

    #[test]
    fn test_window_with_no_days_never_active() {
        let w = window("w1", &[], "00:00", "23:59");
        assert!(!is_window_active(&w, &at(2024, 2, 17, 12, 0)));
    }

    // ==================== Active Status Tests ====================

    #[test]
    fn test_paused_venue_never_active() {
        let mut v = venue(vec![window("w1", &[1, 2, 3, 4, 5, 6, 7], "00:00", "23:59")]);
        v.is_paused = true;
        let status = get_active_free_drink_status(&v, &at(2024, 2, 14, 12, 0));
        assert!(!status.is_active);
        assert!(status.current_window.is_none());
    }

    #[test]
    fn test_no_windows_inactive() {
        let v = Venue::default();
        assert_eq!(
            get_active_free_drink_status(&v, &at(2024, 2, 14, 12, 0)),
            ActiveFreeDrinkStatus::default()
        );

        let v = venue(Vec::new());
        assert!(!get_active_free_drink_status(&v, &at(2024, 2, 14, 12, 0)).is_active);
    }

    #[test]
    fn test_first_matching_window_wins() {
        let v = venue(vec![
            window("late", &[3], "18:00", "20:00"),
            window("first", &[3], "11:00", "15:00"),
            window("second", &[3], "10:00", "14:00"),
        ]);
        let status = get_active_free_drink_status(&v, &at(2024, 2, 14, 12, 0));
        assert!(status.is_active);
        assert_eq!(status.current_window.unwrap().id, "first");
    }

    #[test]
    fn test_no_window_matching_now() {
        let v = venue(vec![window("w1", &[3], "18:00", "20:00")]);
        assert!(!get_active_free_drink_status(&v, &at(2024, 2, 14, 12, 0)).is_active);
    }

    // ==================== Next Window Tests ====================

    #[test]
    fn test_next_window_none_without_windows() {
        assert!(get_next_active_window(&Venue::default(), &at(2024, 2, 14, 12, 0)).is_none());
    }

    #[test]
    fn test_next_window_later_today_picks_earliest_start() {
        let v = venue(vec![
            window("evening", &[3], "20:00", "22:00"),
            window("afternoon", &[3], "15:00", "16:00"),
            window("morning", &[3], "09:00", "10:00"),
        ]);
        let next = get_next_active_window(&v, &at(2024, 2, 14, 12, 0)).unwrap();
        assert_eq!(next.id, "afternoon");
    }

    #[test]
    fn test_next_window_excludes_window_starting_now() {
        let v = venue(vec![window("w1", &[3], "12:00", "14:00")]);
        let (next, starts_at) = next_window_occurrence(&v, &at(2024, 2, 14, 12, 0)).unwrap();
        // Same window next Wednesday
        assert_eq!(next.id, "w1");
        assert_eq!(starts_at, at(2024, 2, 21, 12, 0));
    }

    #[test]
    fn test_next_window_tomorrow_only() {
        let v = venue(vec![window("thursday", &[4], "17:00", "19:00")]);

        let before = get_next_active_window(&v, &at(2024, 2, 14, 9, 0)).unwrap();
        assert_eq!(before.id, "thursday");

        let after = get_next_active_window(&v, &at(2024, 2, 14, 23, 0)).unwrap();
        assert_eq!(after.id, "thursday");
    }

    #[test]
    fn test_next_window_future_day_picks_earliest_start_that_day() {
        let v = venue(vec![
            window("fri-late", &[5], "21:00", "23:00"),
            window("sat", &[6], "10:00", "12:00"),
            window("fri-early", &[5], "16:00", "18:00"),
        ]);
        let (next, starts_at) = next_window_occurrence(&v, &at(2024, 2, 14, 12, 0)).unwrap();
        assert_eq!(next.id, "fri-early");
        assert_eq!(starts_at, at(2024, 2, 16, 16, 0));
    }

    #[test]
    fn test_next_window_wraps_past_sunday() {
        let v = venue(vec![window("monday", &[1], "17:00", "19:00")]);
        // Saturday evening -> Monday
        let (_, starts_at) = next_window_occurrence(&v, &at(2024, 2, 17, 20, 0)).unwrap();
        assert_eq!(starts_at, at(2024, 2, 19, 17, 0));
    }

    #[test]
    fn test_next_window_sunday_is_day_seven() {
        let v = venue(vec![window("sunday", &[7], "13:00", "15:00")]);
        let (_, starts_at) = next_window_occurrence(&v, &at(2024, 2, 12, 8, 0)).unwrap();
        assert_eq!(starts_at, at(2024, 2, 18, 13, 0));
    }

    #[test]
    fn test_next_window_ignores_pause() {
        let mut v = venue(vec![window("w1", &[4], "17:00", "19:00")]);
        v.is_paused = true;
        assert!(get_next_active_window(&v, &at(2024, 2, 14, 12, 0)).is_some());
    }

    #[test]
    fn test_next_window_tie_keeps_storage_order() {
        let v = venue(vec![
            window("a", &[4], "17:00", "19:00"),
            window("b", &[4], "17:00", "18:00"),
        ]);
        let next = get_next_active_window(&v, &at(2024, 2, 14, 12, 0)).unwrap();
        assert_eq!(next.id, "a");
    }

    #[test]
    fn test_next_window_none_when_no_days() {
        let v = venue(vec![window("never", &[], "17:00", "19:00")]);
        assert!(get_next_active_window(&v, &at(2024, 2, 14, 12, 0)).is_none());
    }

    #[test]
    fn test_next_window_at_end_of_calendar() {
        let v = venue(vec![window("daily", &[1, 2, 3, 4, 5, 6, 7], "10:00", "11:00")]);
        let now = NaiveDate::MAX.and_hms_opt(12, 0, 0).unwrap();
        assert!(next_window_occurrence(&v, &now).is_none());
        assert!(time_until_next_window(&v, &now).is_none());

        let evening = window("evening", &[1, 2, 3, 4, 5, 6, 7], "20:00", "21:00");
        let v = venue(vec![evening]);
        let (_, starts_at) = next_window_occurrence(&v, &now).unwrap();
        assert_eq!(starts_at, NaiveDate::MAX.and_hms_opt(20, 0, 0).unwrap());
    }

    #[test]
    fn test_time_until_next_window() {
        let v = venue(vec![window("w1", &[3], "15:30", "16:00")]);
        let until = time_until_next_window(&v, &at(2024, 2, 14, 12, 0)).unwrap();
        assert_eq!(until, Duration::minutes(210));
    }

    // ==================== Property-Based Tests ====================

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        fn window_strategy() -> impl Strategy<Value = FreeDrinkWindow> {
            (
                prop::collection::vec(1u8..=7, 0..7),
                0u8..23,
                0u8..60,
                1u16..600,
            )
                .prop_map(|(days, h, m, len)| {
                    let start = TimeOfDay::new(h, m).unwrap();
                    let end_minutes = (h as u16 * 60 + m as u16 + len).min(23 * 60 + 59);
                    let end = TimeOfDay::new((end_minutes / 60) as u8, (end_minutes % 60) as u8)
                        .unwrap();
                    FreeDrinkWindow {
                        id: format!("{h}{m}{len}"),
                        venue_id: "venue-1".into(),
                        drink_id: "drink".into(),
                        days,
                        start,
                        end,
                        timezone: String::new(),
                    }
                })
        }

        fn datetime_strategy() -> impl Strategy<Value = NaiveDateTime> {
            (0i64..28, 0u32..24, 0u32..60).prop_map(|(d, h, m)| {
                (NaiveDate::from_ymd_opt(2024, 2, 12).unwrap() + Duration::days(d))
                    .and_hms_opt(h, m, 0)
                    .unwrap()
            })
        }

        proptest! {
            #[test]
            fn paused_venue_never_active(
                windows in prop::collection::vec(window_strategy(), 0..8),
                now in datetime_strategy(),
            ) {
                let mut v = venue(windows);
                v.is_paused = true;
                prop_assert!(!get_active_free_drink_status(&v, &now).is_active);
            }

            #[test]
            fn active_window_is_first_active_in_order(
                windows in prop::collection::vec(window_strategy(), 0..8),
                now in datetime_strategy(),
            ) {
                let v = venue(windows);
                let status = get_active_free_drink_status(&v, &now);
                let expected = v.windows().iter().find(|w| is_window_active(w, &now)).cloned();
                prop_assert_eq!(status.is_active, expected.is_some());
                prop_assert_eq!(status.current_window, expected);
            }

            #[test]
            fn next_window_starts_strictly_later_within_a_week(
                windows in prop::collection::vec(window_strategy(), 0..8),
                now in datetime_strategy(),
            ) {
                let v = venue(windows);
                if let Some((window, starts_at)) = next_window_occurrence(&v, &now) {
                    prop_assert!(starts_at > now);
                    prop_assert!(starts_at - now <= Duration::days(7));
                    prop_assert!(window.runs_on(iso_weekday(starts_at.date())));
                } else {
                    prop_assert!(v.windows().iter().all(|w| w.days.is_empty()));
                }
            }

            #[test]
            fn evaluation_is_idempotent(
                windows in prop::collection::vec(window_strategy(), 0..8),
                now in datetime_strategy(),
            ) {
                let v = venue(windows);
                prop_assert_eq!(
                    get_active_free_drink_status(&v, &now),
                    get_active_free_drink_status(&v, &now)
                );
                prop_assert_eq!(
                    get_next_active_window(&v, &now),
                    get_next_active_window(&v, &now)
                );
            }
        }
    }
}
