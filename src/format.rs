//! Display formatting in the dashboard's fixed locale.
//!
//! The platform runs in one market with one currency. [`DISPLAY_LOCALE`]
//! holds that choice (Danish, DKK); the free functions format with it.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::TimeOfDay;

/// Number, currency and date conventions for display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub thousands_separator: char,
    pub currency_prefix: &'static str,
    pub currency_suffix: &'static str,
    /// chrono format string for dates
    pub date_format: &'static str,
}

/// `da-DK` with whole kroner, e.g. `1.234 kr.` and `24.12.2024`.
pub const DA_DK: Locale = Locale {
    thousands_separator: '.',
    currency_prefix: "",
    currency_suffix: " kr.",
    date_format: "%d.%m.%Y",
};

pub const DISPLAY_LOCALE: Locale = DA_DK;

impl Locale {
    /// Round to whole units and group thousands.
    pub fn format_currency(&self, amount: f64) -> String {
        let rounded = amount.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        let digits = format!("{:.0}", rounded.abs());

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(c);
        }

        format!(
            "{sign}{}{grouped}{}",
            self.currency_prefix, self.currency_suffix
        )
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(self.date_format).to_string()
    }

    pub fn format_date_time(&self, datetime: NaiveDateTime) -> String {
        format!(
            "{} {}",
            self.format_date(datetime.date()),
            datetime.format("%H:%M")
        )
    }
}

/// Format an amount as whole kroner, e.g. `1.234 kr.`.
pub fn format_currency(amount: f64) -> String {
    DISPLAY_LOCALE.format_currency(amount)
}

pub fn format_date(date: NaiveDate) -> String {
    DISPLAY_LOCALE.format_date(date)
}

/// Times are already stored in display form.
pub fn format_time(time: &TimeOfDay) -> String {
    time.to_string()
}

pub fn format_date_time(datetime: NaiveDateTime) -> String {
    DISPLAY_LOCALE.format_date_time(datetime)
}
