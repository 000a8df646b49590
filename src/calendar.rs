use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::frequency::CanonicalUnit;

/// add calendar months, clamping to the last valid day of the target month
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// add days, saturating at the calendar bounds
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// advance by `count` periods of `unit`
pub fn add_periods(date: NaiveDate, unit: CanonicalUnit, count: u32) -> NaiveDate {
    match unit {
        CanonicalUnit::Daily => add_days(date, count as i64),
        CanonicalUnit::Weekly => add_days(date, 7 * count as i64),
        CanonicalUnit::Monthly | CanonicalUnit::Quarterly | CanonicalUnit::Yearly => {
            let per_period = unit.months().unwrap_or(1);
            add_months(date, per_period.saturating_mul(count))
        }
    }
}

/// date in the given month with the day clamped to the month length
pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

/// day-of-year in the given year, clamped to the year length
pub fn day_of_year(year: i32, ordinal: u32) -> NaiveDate {
    let max = if is_leap_year(year) { 366 } else { 365 };
    NaiveDate::from_yo_opt(year, ordinal.clamp(1, max)).unwrap_or(NaiveDate::MAX)
}

/// weekday index with Sunday = 0
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// forward distance in days from `date` to the next `target` weekday (0 when equal)
pub fn days_until_weekday(date: NaiveDate, target: u32) -> u32 {
    (target % 7 + 7 - weekday_index(date)) % 7
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// signed whole days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
