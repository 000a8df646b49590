//! Reconciliation of ledger transactions against generated cycles.
//!
//! Every transaction is attributed to at most one cycle. An explicit
//! `cycle_number` in the metadata wins; otherwise the cycle whose bounds
//! contain the payment date takes it; otherwise the earliest cycle whose
//! tolerance window (bounds widened by `tolerance_days` on both sides)
//! contains it. Classification then runs on two axes, timing against the
//! expected date and amount against the expected amount, which are folded
//! into the composite [`CycleStatus`].

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::calendar::{add_days, days_between};
use crate::config::MatchOptions;
use crate::cycles::Cycle;
use crate::decimal::Money;
use crate::types::{AmountStatus, CycleStatus, TimingStatus};

use super::PaymentTransaction;

/// matched cycles plus the transactions no cycle claimed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub cycles: Vec<Cycle>,
    pub unmatched: Vec<PaymentTransaction>,
}

/// classify every cycle against the transactions attributed to it
pub fn match_transactions_to_cycles(
    cycles: &[Cycle],
    transactions: &[PaymentTransaction],
    options: &MatchOptions,
    time_provider: &SafeTimeProvider,
) -> Vec<Cycle> {
    reconcile(cycles, transactions, options, time_provider).cycles
}

/// like [`match_transactions_to_cycles`], also returning unattributed transactions
#[instrument(skip_all, fields(cycles = cycles.len(), transactions = transactions.len()))]
pub fn reconcile(
    cycles: &[Cycle],
    transactions: &[PaymentTransaction],
    options: &MatchOptions,
    time_provider: &SafeTimeProvider,
) -> MatchReport {
    let today = time_provider.now().date_naive();
    let mut buckets: Vec<Vec<&PaymentTransaction>> = vec![Vec::new(); cycles.len()];
    let mut unmatched = Vec::new();

    for tx in transactions {
        match attribute(cycles, tx, options.tolerance_days) {
            Some(index) => {
                trace!(
                    transaction = %tx.id,
                    cycle = cycles[index].cycle_number,
                    "attributed transaction"
                );
                buckets[index].push(tx);
            }
            None => {
                debug!(transaction = %tx.id, date = %tx.value_date(), "transaction matches no cycle");
                unmatched.push(tx.clone());
            }
        }
    }

    let cycles = cycles
        .iter()
        .zip(buckets)
        .map(|(cycle, mut payments)| {
            payments.sort_by_key(|tx| tx.date);
            apply_payments(cycle, &payments, options, today)
        })
        .collect();

    MatchReport { cycles, unmatched }
}

/// index of the single cycle a transaction belongs to
fn attribute(cycles: &[Cycle], tx: &PaymentTransaction, tolerance_days: u32) -> Option<usize> {
    if let Some(number) = tx.cycle_number() {
        return cycles.iter().position(|c| c.cycle_number == number);
    }

    let date = tx.value_date();
    let tolerance = i64::from(tolerance_days);
    cycles.iter().position(|c| c.contains(date)).or_else(|| {
        cycles.iter().position(|c| {
            add_days(c.start_date, -tolerance) <= date && date <= add_days(c.end_date, tolerance)
        })
    })
}

/// fresh copy of `cycle` with the attributed payments applied and classified
fn apply_payments(
    cycle: &Cycle,
    payments: &[&PaymentTransaction],
    options: &MatchOptions,
    today: NaiveDate,
) -> Cycle {
    let mut matched = Cycle {
        actual_amount: Money::ZERO,
        actual_principal: None,
        actual_interest: None,
        payment_count: payments.len() as u32,
        first_payment_date: payments.first().map(|tx| tx.value_date()),
        ..cycle.clone()
    };

    if !payments.is_empty() {
        let mut principal = Money::ZERO;
        let mut interest = Money::ZERO;
        for tx in payments {
            let (p, i) = split_payment(cycle, tx);
            matched.actual_amount += tx.amount;
            principal += p;
            interest += i;
        }
        matched.actual_principal = Some(principal);
        matched.actual_interest = Some(interest);
    }

    let (timing, within_window) = match matched.first_payment_date {
        Some(paid_on) => classify_timing(cycle.expected_date, paid_on, options.tolerance_days),
        None => (TimingStatus::None, false),
    };
    let amount = classify_amount(
        matched.actual_amount,
        cycle.expected_amount,
        cycle.minimum_amount,
        options.amount_tolerance.as_decimal(),
    );

    matched.timing_status = timing;
    matched.amount_status = amount;
    matched.is_within_window = within_window;
    matched.status = composite_status(timing, amount, within_window, cycle.end_date, today);
    matched
}

/// principal and interest portions of one payment
fn split_payment(cycle: &Cycle, tx: &PaymentTransaction) -> (Money, Money) {
    let recorded = tx.metadata.map(|m| (m.principal, m.interest));
    match recorded {
        Some((Some(principal), Some(interest))) => (principal, interest),
        Some((Some(principal), None)) => (principal, (tx.amount - principal).max(Money::ZERO)),
        Some((None, Some(interest))) => ((tx.amount - interest).max(Money::ZERO), interest),
        _ => estimate_split(cycle, tx.amount),
    }
}

/// proportional to the cycle's expected split, or half and half without one
fn estimate_split(cycle: &Cycle, amount: Money) -> (Money, Money) {
    let share = match (cycle.expected_principal, cycle.expected_interest) {
        (Some(p), Some(i)) if (p + i).is_positive() => p.as_decimal() / (p + i).as_decimal(),
        _ => Decimal::new(5, 1),
    };
    let principal = amount.scale(share);
    (principal, amount - principal)
}

/// timing against the expected date; the flag is whether the payment landed inside the window
pub fn classify_timing(expected: NaiveDate, paid_on: NaiveDate, tolerance_days: u32) -> (TimingStatus, bool) {
    let tolerance = i64::from(tolerance_days);
    match days_between(expected, paid_on) {
        d if d < -tolerance => (TimingStatus::Early, false),
        d if d < 0 => (TimingStatus::Early, true),
        0 => (TimingStatus::OnTime, true),
        d if d <= tolerance => (TimingStatus::WithinWindow, true),
        _ => (TimingStatus::Late, false),
    }
}

/// amount against the expected amount, widened by a fractional tolerance
pub fn classify_amount(
    total: Money,
    expected: Money,
    minimum: Option<Money>,
    tolerance: Decimal,
) -> AmountStatus {
    if total.is_zero() {
        return AmountStatus::None;
    }

    let total = total.as_decimal();
    let floor = expected.as_decimal() * (Decimal::ONE - tolerance);
    let ceiling = expected.as_decimal() * (Decimal::ONE + tolerance);

    if total >= ceiling {
        AmountStatus::Over
    } else if total >= floor {
        AmountStatus::Target
    } else if let Some(minimum) = minimum {
        if total < minimum.as_decimal() {
            AmountStatus::BelowMinimum
        } else {
            AmountStatus::MinimumMet
        }
    } else {
        AmountStatus::Partial
    }
}

/// fold the two axes into a single cycle status
pub fn composite_status(
    timing: TimingStatus,
    amount: AmountStatus,
    within_window: bool,
    cycle_end: NaiveDate,
    today: NaiveDate,
) -> CycleStatus {
    match amount {
        AmountStatus::None if cycle_end >= today => CycleStatus::Upcoming,
        AmountStatus::None => CycleStatus::NotPaid,
        AmountStatus::Partial | AmountStatus::BelowMinimum if within_window => CycleStatus::Partial,
        AmountStatus::Partial | AmountStatus::BelowMinimum => CycleStatus::Underpaid,
        AmountStatus::Over | AmountStatus::Target | AmountStatus::MinimumMet => match timing {
            TimingStatus::Early => CycleStatus::PaidEarly,
            TimingStatus::OnTime if amount == AmountStatus::Over => CycleStatus::Overpaid,
            TimingStatus::OnTime | TimingStatus::None => CycleStatus::PaidOnTime,
            TimingStatus::WithinWindow => CycleStatus::PaidWithinWindow,
            TimingStatus::Late => CycleStatus::PaidLate,
        },
    }
}
