//! Shared fixtures for unit tests.

use chrono::{NaiveDate, TimeZone, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing_subscriber::EnvFilter;

use crate::calendar::{add_days, add_months};
use crate::cycles::Cycle;
use crate::decimal::Money;
use crate::payments::PaymentTransaction;
use crate::types::{CycleStatus, TimingStatus};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// time provider frozen at noon UTC on `today`
pub fn provider_at(today: NaiveDate) -> SafeTimeProvider {
    let now = today.and_hms_opt(12, 0, 0).unwrap();
    SafeTimeProvider::new(TimeSource::Test(Utc.from_utc_datetime(&now)))
}

/// transaction booked mid-morning on `on`
pub fn payment_on(on: NaiveDate, amount: Money) -> PaymentTransaction {
    let at = on.and_hms_opt(9, 30, 0).unwrap();
    PaymentTransaction::new(Utc.from_utc_datetime(&at), amount)
}

/// monthly cycle `n` of 2024 already carrying a classification
pub fn classified_cycle(n: u32, expected: Money, status: CycleStatus, actual: Money) -> Cycle {
    let start = add_months(date(2024, 1, 1), n - 1);
    let end = add_days(add_months(start, 1), -1);
    let mut cycle = Cycle::new(n, start, end, start, expected);

    cycle.status = status;
    cycle.actual_amount = actual;
    cycle.timing_status = match status {
        CycleStatus::PaidEarly => TimingStatus::Early,
        CycleStatus::PaidOnTime | CycleStatus::Overpaid => TimingStatus::OnTime,
        CycleStatus::PaidWithinWindow => TimingStatus::WithinWindow,
        CycleStatus::PaidLate => TimingStatus::Late,
        _ => TimingStatus::None,
    };
    cycle.is_within_window = matches!(
        cycle.timing_status,
        TimingStatus::Early | TimingStatus::OnTime | TimingStatus::WithinWindow
    );
    if actual.is_positive() {
        cycle.payment_count = 1;
        cycle.first_payment_date = Some(start);
    }
    cycle
}

/// Log to stderr for the lifetime of the returned guard; filter from RUST_LOG, `warn` otherwise.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}
