//! Weekend and public-holiday filtering.
//!
//! [`HolidayCalendar`] answers whether a date is a public holiday.
//! [`JapaneseHolidays`] derives Japanese national holidays from the statutory
//! rules, [`HolidayList`] holds an explicit list loaded from JSON, and
//! [`CalendarSet`] combines any number of them.

mod japan;
mod list;

pub use japan::JapaneseHolidays;
pub use list::HolidayList;

use crate::detection::types::DailyCount;
use chrono::{Datelike, NaiveDate, Weekday};

pub trait HolidayCalendar {
    /// Name of the holiday on `date`, if any.
    fn holiday_name(&self, date: NaiveDate) -> Option<String>;

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
}

/// Calendar with no holidays; only weekends are filtered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn holiday_name(&self, _date: NaiveDate) -> Option<String> {
        None
    }
}

/// A date is a holiday if any member calendar says so; the first name wins.
#[derive(Default)]
pub struct CalendarSet {
    calendars: Vec<Box<dyn HolidayCalendar + Send + Sync>>,
}

impl CalendarSet {
    pub fn push(&mut self, calendar: impl HolidayCalendar + Send + Sync + 'static) {
        self.calendars.push(Box::new(calendar));
    }

    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }
}

impl HolidayCalendar for CalendarSet {
    fn holiday_name(&self, date: NaiveDate) -> Option<String> {
        self.calendars.iter().find_map(|c| c.holiday_name(date))
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_business_day<C: HolidayCalendar + ?Sized>(date: NaiveDate, calendar: &C) -> bool {
    !is_weekend(date) && !calendar.is_holiday(date)
}

/// Drops rows dated on a weekend or a holiday of `calendar`.
pub fn exclude_weekends_and_holidays<C: HolidayCalendar + ?Sized>(
    rows: Vec<DailyCount>,
    calendar: &C,
) -> Vec<DailyCount> {
    rows.into_iter()
        .filter(|row| is_business_day(row.date, calendar))
        .collect()
}

/// Every holiday of `calendar` in `year`, in date order.
pub fn holidays_in_year<C: HolidayCalendar + ?Sized>(calendar: &C, year: i32) -> Vec<(NaiveDate, String)> {
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| d.year() == year)
        .filter_map(|d| calendar.holiday_name(d).map(|name| (d, name)))
        .collect()
}
