//! Occurrence scheduling for simple recurring items.
//!
//! A schedule is anchored on the definition's start date: the k-th
//! occurrence is computed directly from the start rather than by stepping
//! from the previous one, so month-end clamping never drifts (a schedule
//! starting on Jan 31 visits Feb 29 and then Mar 31). [`next_occurrence`]
//! instead steps one period from the reference date it is given.

use chrono::{Datelike, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::{add_days, add_months, clamped_date, day_of_year, days_between, days_until_weekday};
use crate::config::{RecurrenceDefinition, ScheduleWindow};
use crate::frequency::{CanonicalUnit, Frequency};
use crate::types::OccurrenceStatus;

/// a single scheduled date with its status relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub status: OccurrenceStatus,
    pub days_from_now: i64,
}

impl Occurrence {
    fn new(date: NaiveDate, today: NaiveDate) -> Self {
        let days_from_now = days_between(today, date);
        let status = match days_from_now {
            d if d < 0 => OccurrenceStatus::Overdue,
            0 => OccurrenceStatus::DueToday,
            _ => OccurrenceStatus::Upcoming,
        };
        Self {
            date,
            status,
            days_from_now,
        }
    }
}

/// next occurrence strictly after `from_date`, or `None` once past the end date
///
/// A reference date before the start is clamped to the start.
pub fn next_occurrence(def: &RecurrenceDefinition, from_date: NaiveDate) -> Option<NaiveDate> {
    let from = from_date.max(def.start_date);
    let next = advance_from(def, def.frequency(), from);
    if next <= from || next == NaiveDate::MAX {
        return None;
    }
    within_end(def, next)
}

/// unroll a bounded schedule; "today" comes from the time provider
pub fn generate_schedule(
    def: &RecurrenceDefinition,
    window: ScheduleWindow,
    time_provider: &SafeTimeProvider,
) -> Schedule {
    Schedule {
        definition: def.clone(),
        window,
        today: time_provider.now().date_naive(),
    }
}

/// restartable occurrence sequence; each call to [`Schedule::iter`] starts over
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    definition: RecurrenceDefinition,
    window: ScheduleWindow,
    today: NaiveDate,
}

impl Schedule {
    pub fn iter(&self) -> ScheduleIter<'_> {
        let frequency = self.definition.frequency();
        let lower = self
            .window
            .start_date
            .map_or(self.definition.start_date, |d| d.max(self.definition.start_date));
        let index = first_index_on_or_after(&self.definition, frequency, lower);
        let cap = self.window.limits.max_schedule_occurrences;

        ScheduleIter {
            schedule: self,
            frequency,
            index,
            emitted: 0,
            limit: self.window.max_occurrences.map_or(cap, |m| m.min(cap)),
            cap,
            done: index.is_none(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn upper_bound(&self) -> Option<NaiveDate> {
        match (self.definition.end_date, self.window.end_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = Occurrence;
    type IntoIter = ScheduleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct ScheduleIter<'a> {
    schedule: &'a Schedule,
    frequency: Frequency,
    index: Option<u32>,
    emitted: usize,
    limit: usize,
    cap: usize,
    done: bool,
}

impl Iterator for ScheduleIter<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let index = self.index?;
        let date = occurrence_at(&self.schedule.definition, self.frequency, index);

        if self.schedule.upper_bound().is_some_and(|end| date > end) || date == NaiveDate::MAX {
            self.done = true;
            return None;
        }
        if self.emitted >= self.limit {
            if self.emitted >= self.cap {
                warn!(cap = self.cap, "occurrence schedule truncated at safety cap");
            }
            self.done = true;
            return None;
        }

        self.emitted += 1;
        self.index = index.checked_add(1);
        Some(Occurrence::new(date, self.schedule.today))
    }
}

fn within_end(def: &RecurrenceDefinition, date: NaiveDate) -> Option<NaiveDate> {
    match def.end_date {
        Some(end) if date > end => None,
        _ => Some(date),
    }
}

/// one period on from `from`; a date that does not move past `from` takes one more period
fn advance_from(def: &RecurrenceDefinition, frequency: Frequency, from: NaiveDate) -> NaiveDate {
    let interval = frequency.interval.max(1);
    match frequency.unit {
        CanonicalUnit::Daily => add_days(from, interval as i64),
        CanonicalUnit::Weekly => match def.day_of_occurrence {
            Some(weekday) => {
                let delta = match days_until_weekday(from, weekday) {
                    0 => 7,
                    days => days,
                };
                add_days(from, delta as i64 + 7 * (interval as i64 - 1))
            }
            None => add_days(from, 7 * interval as i64),
        },
        CanonicalUnit::Monthly | CanonicalUnit::Quarterly => {
            let months = frequency.unit.months().unwrap_or(1).saturating_mul(interval);
            let day = def.day_of_occurrence.unwrap_or(def.start_date.day());
            let month_start = clamped_date(from.year(), from.month(), 1);
            let on_day = |months: u32| {
                let target = add_months(month_start, months);
                clamped_date(target.year(), target.month(), day)
            };
            let candidate = on_day(months);
            if candidate > from {
                candidate
            } else {
                on_day(months.saturating_mul(2))
            }
        }
        CanonicalUnit::Yearly => {
            let start = def.start_date;
            let in_year = |years: u32| {
                let year = from.year().saturating_add(years.min(i32::MAX as u32) as i32);
                match def.day_of_occurrence {
                    Some(ordinal) => day_of_year(year, ordinal),
                    None => clamped_date(year, start.month(), start.day()),
                }
            };
            let candidate = in_year(interval);
            if candidate > from {
                candidate
            } else {
                in_year(interval.saturating_mul(2))
            }
        }
    }
}

fn first_index_on_or_after(def: &RecurrenceDefinition, frequency: Frequency, from: NaiveDate) -> Option<u32> {
    match from.pred_opt() {
        Some(previous) => first_index_after(def, frequency, previous),
        None => Some(0),
    }
}

/// smallest index whose occurrence is strictly after `from` and not before the start
fn first_index_after(def: &RecurrenceDefinition, frequency: Frequency, from: NaiveDate) -> Option<u32> {
    let from = from.max(add_days(def.start_date, -1));
    let estimate = estimate_index(def, frequency, from).saturating_sub(1);

    // occurrences strictly increase with the index, so the estimate is at most a few steps short
    (estimate..estimate.saturating_add(4)).find(|k| {
        let date = occurrence_at(def, frequency, *k);
        date > from && date >= def.start_date && date != NaiveDate::MAX
    })
}

fn estimate_index(def: &RecurrenceDefinition, frequency: Frequency, from: NaiveDate) -> u32 {
    let start = def.start_date;
    if from <= start {
        return 0;
    }
    let interval = frequency.interval.max(1) as i64;
    let periods = match frequency.unit {
        CanonicalUnit::Daily => days_between(start, from) / interval,
        CanonicalUnit::Weekly => days_between(start, from) / (7 * interval),
        CanonicalUnit::Monthly | CanonicalUnit::Quarterly | CanonicalUnit::Yearly => {
            let months = (from.year() - start.year()) as i64 * 12 + from.month() as i64
                - start.month() as i64;
            months / (frequency.unit.months().unwrap_or(1) as i64 * interval)
        }
    };
    periods.clamp(0, u32::MAX as i64) as u32
}

/// the k-th occurrence counted from the start anchor (k = 0 may precede the start)
fn occurrence_at(def: &RecurrenceDefinition, frequency: Frequency, k: u32) -> NaiveDate {
    let start = def.start_date;
    let steps = frequency.interval.max(1).saturating_mul(k);
    match frequency.unit {
        CanonicalUnit::Daily => add_days(start, steps as i64),
        CanonicalUnit::Weekly => {
            let offset = def
                .day_of_occurrence
                .map_or(0, |weekday| days_until_weekday(start, weekday));
            add_days(start, offset as i64 + 7 * steps as i64)
        }
        CanonicalUnit::Monthly | CanonicalUnit::Quarterly => {
            let months = frequency.unit.months().unwrap_or(1).saturating_mul(steps);
            let month_start = add_months(clamped_date(start.year(), start.month(), 1), months);
            let day = def.day_of_occurrence.unwrap_or(start.day());
            clamped_date(month_start.year(), month_start.month(), day)
        }
        CanonicalUnit::Yearly => match def.day_of_occurrence {
            Some(ordinal) => {
                let year = start.year().saturating_add(steps.min(i32::MAX as u32) as i32);
                day_of_year(year, ordinal)
            }
            None => add_months(start, 12u32.saturating_mul(steps)),
        },
    }
}
