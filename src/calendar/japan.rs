use super::HolidayCalendar;
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// First day the substitute holiday rule applied, as (year, month, day).
const SUBSTITUTE_RULE_START: (i32, u32, u32) = (1973, 4, 12);

/// Japanese national holidays derived from the Public Holiday Act.
///
/// Covers the fixed and Happy Monday holidays, the equinoxes (1900-2150
/// approximation), substitute holidays after a Sunday holiday, the
/// sandwiched "citizens' holiday", and the 2019-2021 one-off moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct JapaneseHolidays;

impl HolidayCalendar for JapaneseHolidays {
    fn holiday_name(&self, date: NaiveDate) -> Option<String> {
        if let Some(name) = statutory_holiday(date) {
            return Some(name.to_string());
        }
        if is_substitute_holiday(date) {
            return Some("Substitute Holiday".to_string());
        }
        if is_citizens_holiday(date) {
            return Some("Citizens' Holiday".to_string());
        }
        None
    }
}

fn statutory_holiday(date: NaiveDate) -> Option<&'static str> {
    let year = date.year();
    let (month, day) = (date.month(), date.day());

    let name = match (month, day) {
        (1, 1) => "New Year's Day",
        (1, _) if is_coming_of_age_day(date) => "Coming of Age Day",
        (2, 11) if year >= 1967 => "National Foundation Day",
        (2, 23) if year >= 2020 => "Emperor's Birthday",
        (3, d) if Some(d) == vernal_equinox_day(year) => "Vernal Equinox Day",
        (4, 29) if year >= 2007 => "Showa Day",
        (4, 29) if year >= 1989 => "Greenery Day",
        (4, 29) => "Emperor's Birthday",
        (5, 1) if year == 2019 => "Enthronement Day",
        (5, 3) => "Constitution Memorial Day",
        (5, 4) if year >= 2007 => "Greenery Day",
        (5, 5) => "Children's Day",
        (7, _) | (8, _) if is_marine_day(date) => "Marine Day",
        (7, _) | (8, _) if is_mountain_day(date) => "Mountain Day",
        (7, _) | (10, _) if is_sports_day(date) => "Sports Day",
        (9, _) if is_respect_for_aged_day(date) => "Respect for the Aged Day",
        (9, d) if Some(d) == autumnal_equinox_day(year) => "Autumnal Equinox Day",
        (10, 22) if year == 2019 => "Enthronement Ceremony Day",
        (11, 3) => "Culture Day",
        (11, 23) => "Labour Thanksgiving Day",
        (12, 23) if (1989..=2018).contains(&year) => "Emperor's Birthday",
        _ => return None,
    };

    Some(name)
}

fn nth_monday(year: i32, month: u32, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Mon, n)
}

fn is_coming_of_age_day(date: NaiveDate) -> bool {
    if date.year() >= 2000 {
        Some(date) == nth_monday(date.year(), 1, 2)
    } else {
        date.day() == 15
    }
}

fn is_marine_day(date: NaiveDate) -> bool {
    match date.year() {
        2020 => (date.month(), date.day()) == (7, 23),
        2021 => (date.month(), date.day()) == (7, 22),
        y if y >= 2003 => Some(date) == nth_monday(y, 7, 3),
        y if y >= 1996 => (date.month(), date.day()) == (7, 20),
        _ => false,
    }
}

fn is_mountain_day(date: NaiveDate) -> bool {
    match date.year() {
        2020 => (date.month(), date.day()) == (8, 10),
        2021 => (date.month(), date.day()) == (8, 8),
        y if y >= 2016 => (date.month(), date.day()) == (8, 11),
        _ => false,
    }
}

fn is_sports_day(date: NaiveDate) -> bool {
    match date.year() {
        2020 => (date.month(), date.day()) == (7, 24),
        2021 => (date.month(), date.day()) == (7, 23),
        y if y >= 2000 => Some(date) == nth_monday(y, 10, 2),
        y if y >= 1966 => (date.month(), date.day()) == (10, 10),
        _ => false,
    }
}

fn is_respect_for_aged_day(date: NaiveDate) -> bool {
    match date.year() {
        y if y >= 2003 => Some(date) == nth_monday(y, 9, 3),
        y if y >= 1966 => date.day() == 15,
        _ => false,
    }
}

fn equinox_day(year: i32, base_1900: f64, base_1980: f64, base_2100: f64) -> Option<u32> {
    let (base, leap_offset) = match year {
        1900..=1979 => (base_1900, 1983),
        1980..=2099 => (base_1980, 1980),
        2100..=2150 => (base_2100, 1980),
        _ => return None,
    };
    let elapsed = f64::from(year - 1980);
    let leaps = (year - leap_offset) / 4;
    Some((base + 0.242194 * elapsed - f64::from(leaps)).floor() as u32)
}

fn vernal_equinox_day(year: i32) -> Option<u32> {
    equinox_day(year, 20.8357, 20.8431, 21.8510)
}

fn autumnal_equinox_day(year: i32) -> Option<u32> {
    equinox_day(year, 23.2588, 23.2488, 24.2488)
}

/// A non-holiday weekday following an unbroken run of holidays that
/// includes a Sunday. From 1973-04-12 until 2007 only the Monday after a
/// Sunday holiday; never before that.
fn is_substitute_holiday(date: NaiveDate) -> bool {
    if date.weekday() == Weekday::Sun || statutory_holiday(date).is_some() {
        return false;
    }

    if date.year() < 2007 {
        return (date.year(), date.month(), date.day()) >= SUBSTITUTE_RULE_START
            && date.weekday() == Weekday::Mon
            && date
                .checked_sub_days(Days::new(1))
                .is_some_and(|prev| statutory_holiday(prev).is_some());
    }

    let mut prev = date;
    while let Some(day) = prev.checked_sub_days(Days::new(1)) {
        if statutory_holiday(day).is_none() {
            return false;
        }
        if day.weekday() == Weekday::Sun {
            return true;
        }
        prev = day;
    }
    false
}

/// An ordinary weekday sandwiched between two statutory holidays.
fn is_citizens_holiday(date: NaiveDate) -> bool {
    if date.year() < 1988 || date.weekday() == Weekday::Sun || statutory_holiday(date).is_some() {
        return false;
    }

    let before = date.checked_sub_days(Days::new(1));
    let after = date.checked_add_days(Days::new(1));
    matches!((before, after), (Some(b), Some(a))
        if statutory_holiday(b).is_some() && statutory_holiday(a).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::holidays_in_year;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_2025_holidays() {
        let expected = [
            date(2025, 1, 1),
            date(2025, 1, 13),
            date(2025, 2, 11),
            date(2025, 2, 23),
            date(2025, 2, 24),
            date(2025, 3, 20),
            date(2025, 4, 29),
            date(2025, 5, 3),
            date(2025, 5, 4),
            date(2025, 5, 5),
            date(2025, 5, 6),
            date(2025, 7, 21),
            date(2025, 8, 11),
            date(2025, 9, 15),
            date(2025, 9, 23),
            date(2025, 10, 13),
            date(2025, 11, 3),
            date(2025, 11, 23),
            date(2025, 11, 24),
        ];
        let actual: Vec<NaiveDate> = holidays_in_year(&JapaneseHolidays, 2025)
            .into_iter()
            .map(|(d, _)| d)
            .collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_substitute_after_golden_week_sunday() {
        assert_eq!(
            JapaneseHolidays.holiday_name(date(2025, 5, 6)),
            Some("Substitute Holiday".to_string())
        );
    }

    #[test]
    fn test_citizens_holiday_in_september_2026() {
        // Respect for the Aged Day on the 21st, equinox on the 23rd.
        assert_eq!(
            JapaneseHolidays.holiday_name(date(2026, 9, 22)),
            Some("Citizens' Holiday".to_string())
        );
    }

    #[test]
    fn test_2019_enthronement_week() {
        for d in 27..=30 {
            let day = date(2019, 4, d);
            assert_eq!(
                JapaneseHolidays.is_holiday(day),
                d >= 29,
                "2019-04-{d}"
            );
        }
        for d in 1..=6 {
            assert!(JapaneseHolidays.is_holiday(date(2019, 5, d)), "2019-05-0{d}");
        }
    }

    #[test]
    fn test_olympic_moves_2021() {
        assert!(JapaneseHolidays.is_holiday(date(2021, 7, 22)));
        assert!(JapaneseHolidays.is_holiday(date(2021, 7, 23)));
        assert!(JapaneseHolidays.is_holiday(date(2021, 8, 8)));
        assert!(JapaneseHolidays.is_holiday(date(2021, 8, 9)));
        assert!(!JapaneseHolidays.is_holiday(date(2021, 10, 11)));
    }

    #[test]
    fn test_school_term_start_is_a_weekday() {
        assert!(!JapaneseHolidays.is_holiday(date(2025, 4, 7)));
        assert!(!JapaneseHolidays.is_holiday(date(2025, 4, 8)));
    }

    #[test]
    fn test_equinoxes_before_1980() {
        assert!(JapaneseHolidays.is_holiday(date(1960, 3, 20)));
        assert!(!JapaneseHolidays.is_holiday(date(1960, 3, 21)));
        assert!(JapaneseHolidays.is_holiday(date(1960, 9, 23)));
        assert!(JapaneseHolidays.is_holiday(date(1978, 3, 21)));
        assert!(!JapaneseHolidays.is_holiday(date(1978, 3, 20)));
    }

    #[test]
    fn test_no_substitute_before_april_1973() {
        assert!(!JapaneseHolidays.is_holiday(date(1973, 2, 12)));
        assert_eq!(
            JapaneseHolidays.holiday_name(date(1973, 4, 30)),
            Some("Substitute Holiday".to_string())
        );
    }
}
