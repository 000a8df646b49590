pub mod generator;
pub mod statistics;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{AmountStatus, CycleStatus, TimingStatus};

pub use generator::{generate_cycles, next_cycle, CycleCursor};
pub use statistics::{calculate_statistics, CycleStatistics};

/// one period of an obligation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub cycle_number: u32,
    pub start_date: NaiveDate,
    /// inclusive; the day before the next cycle starts
    pub end_date: NaiveDate,
    pub expected_amount: Money,
    pub minimum_amount: Option<Money>,
    pub expected_date: NaiveDate,
    pub actual_amount: Money,
    pub status: CycleStatus,
    pub timing_status: TimingStatus,
    pub amount_status: AmountStatus,
    pub is_within_window: bool,
    pub expected_principal: Option<Money>,
    pub expected_interest: Option<Money>,
    pub remaining_balance: Option<Money>,
    pub actual_principal: Option<Money>,
    pub actual_interest: Option<Money>,
    pub payment_count: u32,
    pub first_payment_date: Option<NaiveDate>,
}

impl Cycle {
    pub fn new(
        cycle_number: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        expected_date: NaiveDate,
        expected_amount: Money,
    ) -> Self {
        Self {
            cycle_number,
            start_date,
            end_date,
            expected_amount,
            minimum_amount: None,
            expected_date,
            actual_amount: Money::ZERO,
            status: CycleStatus::Upcoming,
            timing_status: TimingStatus::None,
            amount_status: AmountStatus::None,
            is_within_window: false,
            expected_principal: None,
            expected_interest: None,
            remaining_balance: None,
            actual_principal: None,
            actual_interest: None,
            payment_count: 0,
            first_payment_date: None,
        }
    }

    /// whether the date falls inside the cycle bounds
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn has_payments(&self) -> bool {
        self.payment_count > 0
    }

    pub fn is_paid(&self) -> bool {
        self.status.is_paid()
    }

    /// amount still owed against the expected amount
    pub fn shortfall(&self) -> Money {
        (self.expected_amount - self.actual_amount).max(Money::ZERO)
    }

    /// amount paid beyond the expected amount
    pub fn overpayment(&self) -> Money {
        (self.actual_amount - self.expected_amount).max(Money::ZERO)
    }

    pub fn is_amortized(&self) -> bool {
        self.remaining_balance.is_some()
    }
}

/// cycle whose bounds contain `today`
pub fn current_cycle(cycles: &[Cycle], today: NaiveDate) -> Option<&Cycle> {
    cycles.iter().find(|c| c.contains(today))
}

/// earliest unsettled cycle that is due today or later
pub fn next_due_cycle(cycles: &[Cycle], today: NaiveDate) -> Option<&Cycle> {
    cycles
        .iter()
        .find(|c| c.expected_date >= today && !c.is_paid())
}
