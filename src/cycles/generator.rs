use chrono::{Datelike, NaiveDate};
use tracing::{error, instrument, trace, warn};

use crate::calendar::{add_days, add_periods, clamped_date, day_of_year, days_until_weekday};
use crate::config::CycleOptions;
use crate::cycles::Cycle;
use crate::errors::{ObligationError, Result};
use crate::frequency::CanonicalUnit;
use crate::interest::{BalanceState, ReducingBalance};

/// state carried from one generated cycle to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleCursor {
    pub cycle_number: u32,
    pub balance: Option<BalanceState>,
}

impl CycleCursor {
    pub fn opening(options: &CycleOptions) -> Self {
        Self {
            cycle_number: 1,
            balance: options
                .amortization
                .map(|terms| BalanceState::opening(terms.starting_balance)),
        }
    }

    /// an amortized balance has been repaid
    pub fn is_settled(&self) -> bool {
        self.balance.is_some_and(|b| b.is_settled())
    }
}

/// partition the timeline described by `options` into contiguous cycles
#[instrument(
    skip(options),
    fields(start = %options.start_date, frequency = %options.frequency, max_cycles = options.max_cycles)
)]
pub fn generate_cycles(options: &CycleOptions) -> Result<Vec<Cycle>> {
    options.validate()?;

    let cap = options.limits.max_cycle_iterations;
    let mut cycles: Vec<Cycle> = Vec::new();
    let mut cursor = CycleCursor::opening(options);
    let mut iterations = 0;

    while (cycles.len() as u32) < options.max_cycles && !cursor.is_settled() {
        if iterations >= cap {
            warn!(cap, "cycle generation truncated at iteration cap");
            break;
        }
        iterations += 1;

        let (start, _) = cycle_bounds(options, cursor.cycle_number);
        if options.end_date.is_some_and(|end| start > end) {
            break;
        }
        if cycles.last().is_some_and(|prev| start <= prev.start_date) {
            warn!(cycle = cursor.cycle_number, %start, "cycle bounds saturated at the calendar limit");
            break;
        }

        let (cycle, next) = next_cycle(options, cursor);
        check_sequence(cycles.last(), &cycle)?;
        trace!(
            cycle = cycle.cycle_number,
            start = %cycle.start_date,
            end = %cycle.end_date,
            due = %cycle.expected_date,
            "generated cycle"
        );

        cycles.push(cycle);
        cursor = next;
    }

    Ok(cycles)
}

/// build the cycle at `cursor` and the cursor for the cycle after it
pub fn next_cycle(options: &CycleOptions, cursor: CycleCursor) -> (Cycle, CycleCursor) {
    let (start, end) = cycle_bounds(options, cursor.cycle_number);
    let due = expected_date(options, start, end);

    let mut cycle = Cycle::new(cursor.cycle_number, start, end, due, options.expected_amount);
    cycle.minimum_amount = options.minimum_amount;

    let balance = match (options.amortization, cursor.balance) {
        (Some(terms), Some(state)) => {
            let engine = ReducingBalance::new(terms.annual_rate, options.frequency, terms.interest_included);
            let (split, next) = engine.step(state, options.expected_amount);
            cycle.expected_principal = Some(split.principal);
            cycle.expected_interest = Some(split.interest);
            cycle.remaining_balance = Some(split.remaining_balance);
            Some(next)
        }
        _ => None,
    };

    let next = CycleCursor {
        cycle_number: cursor.cycle_number + 1,
        balance,
    };
    (cycle, next)
}

/// inclusive bounds of the n-th cycle, anchored on the options' start date
fn cycle_bounds(options: &CycleOptions, cycle_number: u32) -> (NaiveDate, NaiveDate) {
    let unit = options.frequency.unit;
    let interval = options.frequency.interval.max(1);
    let index = cycle_number.saturating_sub(1);

    let start = add_periods(options.start_date, unit, index.saturating_mul(interval));
    let next_start = add_periods(options.start_date, unit, cycle_number.saturating_mul(interval));
    (start, add_days(next_start, -1).max(start))
}

/// due date inside `[start, end]`, clamped to the cycle end
fn expected_date(options: &CycleOptions, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let Some(day) = options.day_of_occurrence else {
        return start;
    };

    let candidate = match options.frequency.unit {
        CanonicalUnit::Daily => start,
        CanonicalUnit::Weekly => add_days(start, days_until_weekday(start, day) as i64),
        CanonicalUnit::Monthly | CanonicalUnit::Quarterly => {
            let same_month = clamped_date(start.year(), start.month(), day);
            if same_month >= start {
                same_month
            } else {
                let following = add_periods(clamped_date(start.year(), start.month(), 1), CanonicalUnit::Monthly, 1);
                clamped_date(following.year(), following.month(), day)
            }
        }
        CanonicalUnit::Yearly => {
            let same_year = day_of_year(start.year(), day);
            if same_year >= start {
                same_year
            } else {
                day_of_year(start.year() + 1, day)
            }
        }
    };
    candidate.clamp(start, end)
}

fn check_sequence(previous: Option<&Cycle>, cycle: &Cycle) -> Result<()> {
    let violation = match previous {
        None if cycle.cycle_number != 1 => Some("first cycle is not numbered 1".to_string()),
        Some(prev) if cycle.cycle_number != prev.cycle_number + 1 => Some(format!(
            "cycle number follows {}",
            prev.cycle_number
        )),
        Some(prev) if cycle.start_date <= prev.start_date => Some(format!(
            "starts {} which does not follow previous start {}",
            cycle.start_date, prev.start_date
        )),
        Some(prev) if prev.end_date.succ_opt() != Some(cycle.start_date) => Some(format!(
            "starts {} but previous cycle ends {}",
            cycle.start_date, prev.end_date
        )),
        _ if cycle.end_date < cycle.start_date => Some("ends before it starts".to_string()),
        _ => None,
    };

    match violation {
        Some(message) => {
            error!(cycle = cycle.cycle_number, %message, "cycle sequence violated");
            Err(ObligationError::CycleSequenceViolation {
                cycle_number: cycle.cycle_number,
                message,
            })
        }
        None => Ok(()),
    }
}
