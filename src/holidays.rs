//! England & Wales bank-holiday calendar and business-day arithmetic.
//!
//! Turnaround KPIs count working days between order entry and dispatch, so
//! the calendar must cover every year the data touches. Fixed-date holidays
//! that land on a weekend are substituted to the following weekday, matching
//! the official observed dates. One-off proclaimed holidays (jubilees,
//! state funerals) are not modelled.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Set of observed bank-holiday dates over a span of years.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Build the England & Wales calendar for the given years.
    pub fn united_kingdom(years: RangeInclusive<i32>) -> Self {
        let mut dates = BTreeSet::new();
        for year in years {
            dates.extend(bank_holidays(year));
        }
        Self { dates }
    }

    /// An empty calendar: every weekday counts as a business day.
    pub fn none() -> Self {
        Self { dates: BTreeSet::new() }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Count business days (Mon-Fri, not in `calendar`) in the inclusive range
/// `[start, end]`. Returns 0 when `end < start`.
pub fn business_days_between(start: NaiveDate, end: NaiveDate, calendar: &HolidayCalendar) -> u32 {
    let mut count = 0;
    let mut day = start;
    while day <= end {
        if is_business_day(day, calendar) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}

pub fn is_business_day(date: NaiveDate, calendar: &HolidayCalendar) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !calendar.contains(date)
}

/// Observed England & Wales bank holidays for one year.
fn bank_holidays(year: i32) -> Vec<NaiveDate> {
    let easter = easter_sunday(year);
    let mut days = vec![
        observed(NaiveDate::from_ymd_opt(year, 1, 1).expect("new year")),
        easter - Duration::days(2), // Good Friday
        easter + Duration::days(1), // Easter Monday
        first_monday(year, 5),
        last_monday(year, 5),
        last_monday(year, 8),
    ];
    days.extend(christmas_holidays(year));
    days
}

/// Christmas Day and Boxing Day, shifted onto the next free weekdays when
/// either lands on a weekend.
fn christmas_holidays(year: i32) -> [NaiveDate; 2] {
    let christmas = NaiveDate::from_ymd_opt(year, 12, 25).expect("christmas");
    let mut observed_christmas = christmas;
    while is_weekend(observed_christmas) {
        observed_christmas += Duration::days(1);
    }
    let mut boxing = christmas + Duration::days(1);
    while is_weekend(boxing) || boxing == observed_christmas {
        boxing += Duration::days(1);
    }
    [observed_christmas, boxing]
}

fn observed(date: NaiveDate) -> NaiveDate {
    let mut day = date;
    while is_weekend(day) {
        day += Duration::days(1);
    }
    day
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn first_monday(year: i32, month: u32) -> NaiveDate {
    let mut day = NaiveDate::from_ymd_opt(year, month, 1).expect("month start");
    while day.weekday() != Weekday::Mon {
        day += Duration::days(1);
    }
    day
}

fn last_monday(year: i32, month: u32) -> NaiveDate {
    let last_dom = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("next month start")
        - Duration::days(1);
    let mut day = last_dom;
    while day.weekday() != Weekday::Mon {
        day -= Duration::days(1);
    }
    day
}

/// Gregorian computus (Meeus/Jones/Butcher).
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("computus")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn easter_known_years() {
        assert_eq!(easter_sunday(2024), date(2024, 3, 31));
        assert_eq!(easter_sunday(2025), date(2025, 4, 20));
        assert_eq!(easter_sunday(2026), date(2026, 4, 5));
    }

    #[test]
    fn calendar_2024_observed_dates() {
        let cal = HolidayCalendar::united_kingdom(2024..=2024);
        assert!(cal.contains(date(2024, 1, 1))); // New Year, a Monday
        assert!(cal.contains(date(2024, 3, 29))); // Good Friday
        assert!(cal.contains(date(2024, 4, 1))); // Easter Monday
        assert!(cal.contains(date(2024, 5, 6))); // early May
        assert!(cal.contains(date(2024, 5, 27))); // spring
        assert!(cal.contains(date(2024, 8, 26))); // summer
        assert!(cal.contains(date(2024, 12, 25)));
        assert!(cal.contains(date(2024, 12, 26)));
        assert_eq!(cal.len(), 8);
    }

    #[test]
    fn weekend_christmas_substituted() {
        // 2021: Christmas on Saturday, Boxing Day on Sunday; observed on
        // Monday 27th and Tuesday 28th.
        let cal = HolidayCalendar::united_kingdom(2021..=2021);
        assert!(!cal.contains(date(2021, 12, 25)));
        assert!(!cal.contains(date(2021, 12, 26)));
        assert!(cal.contains(date(2021, 12, 27)));
        assert!(cal.contains(date(2021, 12, 28)));
    }

    #[test]
    fn weekend_new_year_substituted() {
        // 1 Jan 2022 was a Saturday; observed Monday 3rd.
        let cal = HolidayCalendar::united_kingdom(2022..=2022);
        assert!(!cal.contains(date(2022, 1, 1)));
        assert!(cal.contains(date(2022, 1, 3)));
    }

    #[test]
    fn business_day_counting_skips_weekends_and_holidays() {
        let cal = HolidayCalendar::united_kingdom(2024..=2024);
        // Fri 3 May .. Tue 7 May 2024: Sat, Sun and the early-May bank
        // holiday (Mon 6th) all drop out.
        assert_eq!(business_days_between(date(2024, 5, 3), date(2024, 5, 7), &cal), 2);
        // Same-day weekday range counts itself.
        assert_eq!(business_days_between(date(2024, 5, 8), date(2024, 5, 8), &cal), 1);
        // Inverted range is empty, not negative.
        assert_eq!(business_days_between(date(2024, 5, 9), date(2024, 5, 8), &cal), 0);
    }

    #[test]
    fn empty_calendar_counts_plain_weekdays() {
        let cal = HolidayCalendar::none();
        assert_eq!(business_days_between(date(2024, 5, 6), date(2024, 5, 10), &cal), 5);
    }
}
