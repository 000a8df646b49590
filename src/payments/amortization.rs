use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::calendar::add_periods;
use crate::config::EngineLimits;
use crate::decimal::{Money, Rate};
use crate::frequency::Frequency;
use crate::interest::{annuity_payment, compound_factor, BalanceState, ReducingBalance};

/// starting guess for the rate solver, in annual percent
const SOLVER_INITIAL_RATE: Decimal = dec!(10);
/// convergence threshold on successive iterates, in annual percentage points
const SOLVER_TOLERANCE: Decimal = dec!(0.0001);
const SOLVER_MIN_RATE: Decimal = dec!(0.001);
const SOLVER_MAX_RATE: Decimal = dec!(99);

/// one period of a reducing-balance schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub payment_number: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub remaining_balance: Money,
}

/// amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub payment: Money,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub entries: Vec<AmortizationEntry>,
    pub total_interest: Money,
    pub total_paid: Money,
    /// the period cap was hit before the balance was repaid
    pub truncated: bool,
}

impl AmortizationSchedule {
    /// get payment for specific period
    pub fn get_payment(&self, payment_number: u32) -> Option<&AmortizationEntry> {
        let index = payment_number.checked_sub(1)?;
        self.entries.get(index as usize)
    }

    /// get remaining balance after payment
    pub fn balance_after_payment(&self, payment_number: u32) -> Money {
        self.get_payment(payment_number)
            .map(|p| p.remaining_balance)
            .unwrap_or(self.principal)
    }

    /// date of the final payment, if the schedule repays the balance
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        if self.truncated {
            return None;
        }
        self.entries.last().map(|e| e.due_date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// outcome of the loan-term solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanTerm {
    Months(u32),
    /// the payment never exceeds the interest, so the balance never falls
    Never,
}

impl LoanTerm {
    pub fn months(&self) -> Option<u32> {
        match self {
            LoanTerm::Months(m) => Some(*m),
            LoanTerm::Never => None,
        }
    }
}

/// why the rate solver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverTermination {
    Converged,
    IterationCap,
}

/// result of solving for the interest rate implied by loan terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSolution {
    pub annual_rate_percent: Decimal,
    pub iterations: u32,
    pub termination: SolverTermination,
}

impl RateSolution {
    pub fn converged(&self) -> bool {
        self.termination == SolverTermination::Converged
    }

    pub fn annual_rate(&self) -> Rate {
        Rate::from_percent(self.annual_rate_percent)
    }
}

/// amortization calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationCalculator {
    limits: EngineLimits,
}

impl AmortizationCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: EngineLimits) -> Self {
        Self { limits }
    }

    /// level monthly payment for a fully amortizing loan
    pub fn monthly_payment(&self, principal: Money, annual_rate: Rate, months: u32) -> Money {
        let monthly_rate = annual_rate.monthly_rate().as_decimal();
        Money::from_decimal(annuity_payment(principal.as_decimal(), monthly_rate, months))
    }

    /// number of monthly payments needed to repay `principal` with `payment`
    pub fn loan_term_months(&self, principal: Money, annual_rate: Rate, payment: Money) -> LoanTerm {
        if !principal.is_positive() {
            return LoanTerm::Months(0);
        }
        if !payment.is_positive() {
            return LoanTerm::Never;
        }

        let r = annual_rate.monthly_rate().as_decimal();
        let p = principal.as_decimal();
        let a = payment.as_decimal();

        if r.is_zero() {
            return ceil_to_months(p / a);
        }

        // payment must exceed the first period's interest
        if a <= p * r {
            return LoanTerm::Never;
        }

        // n = -ln(1 - rP/A) / ln(1 + r)
        let remaining_fraction = Decimal::ONE - r * p / a;
        let n = -remaining_fraction.ln() / (Decimal::ONE + r).ln();
        ceil_to_months(n)
    }

    /// annual rate implied by principal, payment and term, via newton's method
    #[instrument(skip(self), level = "debug")]
    pub fn interest_rate_from_terms(&self, principal: Money, payment: Money, months: u32) -> RateSolution {
        let l = principal.as_decimal();
        let target = payment.as_decimal();
        let n = months.max(1);
        let min_rate = SOLVER_MIN_RATE / dec!(1200);
        let max_rate = SOLVER_MAX_RATE / dec!(1200);

        let mut rate = SOLVER_INITIAL_RATE / dec!(1200);
        let mut iterations = 0;

        while iterations < self.limits.max_solver_iterations {
            iterations += 1;

            let next = match newton_step(l, target, rate, n) {
                Some(next) => next.clamp(min_rate, max_rate),
                None => {
                    debug!(iterations, "rate solver derivative vanished");
                    break;
                }
            };
            let delta = ((next - rate) * dec!(1200)).abs();
            rate = next;

            if delta < SOLVER_TOLERANCE {
                return RateSolution {
                    annual_rate_percent: (rate * dec!(1200)).round_dp(4),
                    iterations,
                    termination: SolverTermination::Converged,
                };
            }
        }

        debug!(iterations, "rate solver stopped before converging");
        RateSolution {
            annual_rate_percent: (rate * dec!(1200)).round_dp(4),
            iterations,
            termination: SolverTermination::IterationCap,
        }
    }

    /// reducing-balance schedule for a fixed payment
    #[instrument(skip(self), level = "debug")]
    pub fn generate_schedule(
        &self,
        principal: Money,
        annual_rate: Rate,
        payment: Money,
        start_date: NaiveDate,
        frequency: Frequency,
        interest_included: bool,
    ) -> AmortizationSchedule {
        let engine = ReducingBalance::new(annual_rate, frequency, interest_included);
        let cap = self.limits.max_amortization_periods;

        let mut entries = Vec::new();
        let mut state = BalanceState::opening(principal.max(Money::ZERO));

        while !state.is_settled() && state.periods_elapsed < cap {
            let (split, next) = engine.step_clamped(state, payment);
            let payment_number = next.periods_elapsed;

            entries.push(AmortizationEntry {
                payment_number,
                due_date: add_periods(
                    start_date,
                    frequency.unit,
                    payment_number.saturating_mul(frequency.interval),
                ),
                amount: split.payment,
                principal_amount: split.principal,
                interest_amount: split.interest,
                remaining_balance: split.remaining_balance,
            });
            state = next;
        }

        let truncated = !state.is_settled();
        if truncated {
            warn!(
                periods = cap,
                remaining = %state.balance,
                "amortization schedule truncated at period cap"
            );
        }

        let total_interest = entries.iter().map(|e| e.interest_amount).sum();
        let total_paid = entries.iter().map(|e| e.amount).sum();

        AmortizationSchedule {
            principal,
            annual_rate,
            payment,
            frequency,
            start_date,
            entries,
            total_interest,
            total_paid,
            truncated,
        }
    }
}

/// one newton iteration on f(r) = L r / (1 - (1 + r)^-n) - payment
fn newton_step(principal: Decimal, payment: Decimal, rate: Decimal, periods: u32) -> Option<Decimal> {
    let q = match compound_factor(rate, periods) {
        Some(factor) if !factor.is_zero() => Decimal::ONE / factor,
        _ => Decimal::ZERO,
    };
    let one_minus_q = Decimal::ONE - q;
    if one_minus_q.is_zero() {
        return None;
    }

    let f = principal * rate / one_minus_q - payment;
    let numerator = one_minus_q - rate * Decimal::from(periods) * q / (Decimal::ONE + rate);
    let df = principal * numerator / (one_minus_q * one_minus_q);
    if df.is_zero() {
        return None;
    }
    Some(rate - f / df)
}

fn ceil_to_months(n: Decimal) -> LoanTerm {
    match n.ceil().to_u32() {
        Some(months) => LoanTerm::Months(months),
        None => LoanTerm::Never,
    }
}
