use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::frequency::Frequency;

/// balance at or below which a liability counts as repaid
pub const SETTLED_BALANCE: Money = Money::CENT;

/// running state threaded through a reducing-balance walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceState {
    pub balance: Money,
    pub periods_elapsed: u32,
}

impl BalanceState {
    pub fn opening(balance: Money) -> Self {
        Self {
            balance,
            periods_elapsed: 0,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.balance <= SETTLED_BALANCE
    }
}

/// split of one period's payment into interest and principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSplit {
    pub opening_balance: Money,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub remaining_balance: Money,
}

/// one-period step of a reducing-balance liability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducingBalance {
    period_rate: Decimal,
    interest_included: bool,
}

impl ReducingBalance {
    /// per-period rate is the annual rate spread over the unit's periods per year;
    /// the interval only spaces the periods out and does not scale the rate
    pub fn new(annual_rate: Rate, frequency: Frequency, interest_included: bool) -> Self {
        Self {
            period_rate: annual_rate.per_period(frequency.unit.periods_per_year()).as_decimal(),
            interest_included,
        }
    }

    pub fn period_rate(&self) -> Decimal {
        self.period_rate
    }

    /// interest charged on `balance` for one period, rounded to cents
    pub fn period_interest(&self, balance: Money) -> Money {
        Money::from_decimal(balance.as_decimal() * self.period_rate)
    }

    /// apply one payment; returns the split and the state carried into the next period
    pub fn step(&self, state: BalanceState, payment: Money) -> (PeriodSplit, BalanceState) {
        let interest = self.period_interest(state.balance);
        let principal = if self.interest_included {
            (payment - interest).max(Money::ZERO)
        } else {
            payment
        };
        let remaining_balance = (state.balance - principal).max(Money::ZERO);

        let split = PeriodSplit {
            opening_balance: state.balance,
            payment,
            principal,
            interest,
            remaining_balance,
        };
        let next = BalanceState {
            balance: remaining_balance,
            periods_elapsed: state.periods_elapsed + 1,
        };
        (split, next)
    }

    /// like [`step`](Self::step), but the principal never exceeds the balance and a
    /// leftover at or below one cent is folded into the final payment
    pub fn step_clamped(&self, state: BalanceState, payment: Money) -> (PeriodSplit, BalanceState) {
        let (mut split, mut next) = self.step(state, payment);
        if split.principal >= state.balance || next.is_settled() {
            split.principal = state.balance;
            split.payment = if self.interest_included {
                state.balance + split.interest
            } else {
                state.balance
            };
            split.remaining_balance = Money::ZERO;
            next.balance = Money::ZERO;
        }
        (split, next)
    }
}
