use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cycles::Cycle;
use crate::decimal::{Money, Rate};
use crate::types::{AmountStatus, CycleStatus, SuggestionReason, TimingStatus, Urgency};

/// annual rate above which paying extra is recommended
const HIGH_INTEREST_RATE: Decimal = dec!(0.10);
/// balance multiple of the expected amount that makes high interest worth acting on
const HIGH_INTEREST_BALANCE_MULTIPLE: Decimal = dec!(10);
const HIGH_INTEREST_UPLIFT: Decimal = dec!(1.2);
/// balance multiple of the expected amount at which paying off outright is suggested
const NEAR_PAYOFF_MULTIPLE: Decimal = dec!(1.5);

/// payment amount recommended for the next cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSuggestion {
    /// always a whole currency amount
    pub suggested_amount: Money,
    pub reason: SuggestionReason,
    pub explanation: String,
    pub urgency: Urgency,
}

impl PaymentSuggestion {
    fn new(amount: Money, reason: SuggestionReason, urgency: Urgency, explanation: String) -> Self {
        Self {
            suggested_amount: amount.ceil_whole(),
            reason,
            explanation,
            urgency,
        }
    }
}

/// suggest the next payment from the cycle history
///
/// Scenarios are checked in priority order and the first match wins. Returns
/// `None` when the expected amount is not positive. `outstanding_balance` is
/// zero for obligations without a balance.
pub fn suggest(
    expected: Money,
    previous_cycles: &[Cycle],
    outstanding_balance: Money,
    interest_rate: Option<Rate>,
) -> Option<PaymentSuggestion> {
    if !expected.is_positive() {
        return None;
    }

    let suggestion = first_payment(expected, previous_cycles)
        .or_else(|| catch_up(expected, previous_cycles))
        .or_else(|| missed_payments(expected, previous_cycles))
        .or_else(|| consistent_overpayment(expected, previous_cycles))
        .or_else(|| late_payment_reminder(expected, previous_cycles))
        .or_else(|| high_interest(expected, outstanding_balance, interest_rate))
        .or_else(|| near_payoff(expected, outstanding_balance))
        .unwrap_or_else(|| {
            PaymentSuggestion::new(
                expected,
                SuggestionReason::Standard,
                Urgency::Low,
                format!("Pay the regular amount of {expected}."),
            )
        });

    debug!(
        reason = ?suggestion.reason,
        amount = %suggestion.suggested_amount,
        "payment suggestion"
    );
    Some(suggestion)
}

fn first_payment(expected: Money, cycles: &[Cycle]) -> Option<PaymentSuggestion> {
    cycles.is_empty().then(|| {
        PaymentSuggestion::new(
            expected,
            SuggestionReason::FirstPayment,
            Urgency::Low,
            format!("First payment: start with the expected amount of {expected}."),
        )
    })
}

fn catch_up(expected: Money, cycles: &[Cycle]) -> Option<PaymentSuggestion> {
    let short: Vec<&Cycle> = cycles.iter().filter(|c| c.status.is_short()).collect();
    let shortfall: Money = short.iter().map(|c| c.shortfall()).sum();
    if short.len() < 2 || !shortfall.is_positive() {
        return None;
    }

    Some(PaymentSuggestion::new(
        expected + shortfall / dec!(2),
        SuggestionReason::CatchUp,
        Urgency::Medium,
        format!(
            "{} recent cycles were paid short by {shortfall} in total; adding half of it catches up gradually.",
            short.len()
        ),
    ))
}

fn missed_payments(expected: Money, cycles: &[Cycle]) -> Option<PaymentSuggestion> {
    let missed: Vec<&Cycle> = cycles
        .iter()
        .filter(|c| c.status == CycleStatus::NotPaid)
        .collect();
    let missed_total: Money = missed.iter().map(|c| c.expected_amount).sum();
    if missed.is_empty() || !missed_total.is_positive() {
        return None;
    }

    let spread = Decimal::from(missed.len().max(2) as u64);
    Some(PaymentSuggestion::new(
        expected + missed_total / spread,
        SuggestionReason::MissedPayments,
        Urgency::High,
        format!(
            "{} cycle(s) were missed ({missed_total} outstanding); spread the arrears over the next payments.",
            missed.len()
        ),
    ))
}

fn consistent_overpayment(expected: Money, cycles: &[Cycle]) -> Option<PaymentSuggestion> {
    let paid = cycles.iter().filter(|c| c.is_paid()).count();
    let over: Vec<&Cycle> = cycles
        .iter()
        .filter(|c| c.amount_status == AmountStatus::Over)
        .collect();
    if paid < 3 || over.len() < 2 {
        return None;
    }

    let average = over.iter().map(|c| c.overpayment()).sum::<Money>() / Decimal::from(over.len() as u64);
    Some(PaymentSuggestion::new(
        expected + average,
        SuggestionReason::ConsistentOverpayment,
        Urgency::Low,
        format!("You usually pay about {average} more than required; keep it up."),
    ))
}

fn late_payment_reminder(expected: Money, cycles: &[Cycle]) -> Option<PaymentSuggestion> {
    let late = cycles
        .iter()
        .filter(|c| c.timing_status == TimingStatus::Late)
        .count();
    if cycles.len() < 3 || late < 2 {
        return None;
    }

    Some(PaymentSuggestion::new(
        expected,
        SuggestionReason::LatePaymentReminder,
        Urgency::Medium,
        format!("{late} of the last {} payments were late; schedule this one ahead of the due date.", cycles.len()),
    ))
}

fn high_interest(expected: Money, balance: Money, rate: Option<Rate>) -> Option<PaymentSuggestion> {
    let rate = rate?;
    if rate.as_decimal() <= HIGH_INTEREST_RATE || balance <= expected * HIGH_INTEREST_BALANCE_MULTIPLE {
        return None;
    }

    Some(PaymentSuggestion::new(
        expected * HIGH_INTEREST_UPLIFT,
        SuggestionReason::HighInterest,
        Urgency::Medium,
        format!("At {rate} interest on a balance of {balance}, paying 20% extra reduces the total cost."),
    ))
}

fn near_payoff(expected: Money, balance: Money) -> Option<PaymentSuggestion> {
    if !balance.is_positive() || balance > expected * NEAR_PAYOFF_MULTIPLE {
        return None;
    }

    Some(PaymentSuggestion::new(
        balance,
        SuggestionReason::NearPayoff,
        Urgency::Low,
        format!("Only {balance} remains; pay it off in full."),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::classified_cycle;

    fn expected() -> Money {
        Money::from_major(1_000)
    }

    fn short(n: u32, status: CycleStatus, paid: i64) -> Cycle {
        classified_cycle(n, expected(), status, Money::from_major(paid))
    }

    fn on_time(n: u32) -> Cycle {
        short(n, CycleStatus::PaidOnTime, 1_000)
    }

    #[test]
    fn test_no_suggestion_without_expected_amount() {
        assert!(suggest(Money::ZERO, &[], Money::ZERO, None).is_none());
        assert!(suggest(Money::from_major(-10), &[], Money::ZERO, None).is_none());
    }

    #[test]
    fn test_first_payment() {
        let s = suggest(Money::from_decimal(dec!(49.99)), &[], Money::ZERO, None).unwrap();
        assert_eq!(s.reason, SuggestionReason::FirstPayment);
        assert_eq!(s.suggested_amount, Money::from_major(50));
        assert_eq!(s.urgency, Urgency::Low);
    }

    #[test]
    fn test_catch_up_adds_half_the_shortfall() {
        let cycles = vec![
            short(1, CycleStatus::Underpaid, 900),
            short(2, CycleStatus::Partial, 850),
            short(3, CycleStatus::Underpaid, 950),
        ];
        let s = suggest(expected(), &cycles, Money::ZERO, None).unwrap();

        assert_eq!(s.reason, SuggestionReason::CatchUp);
        assert_eq!(s.suggested_amount, Money::from_major(1_150));
        assert_eq!(s.urgency, Urgency::Medium);
    }

    #[test]
    fn test_single_short_cycle_is_not_catch_up() {
        let cycles = vec![short(1, CycleStatus::Partial, 500), on_time(2)];
        let s = suggest(expected(), &cycles, Money::ZERO, None).unwrap();
        assert_eq!(s.reason, SuggestionReason::Standard);
    }

    #[test]
    fn test_missed_payments_spread_over_at_least_two() {
        let cycles = vec![on_time(1), short(2, CycleStatus::NotPaid, 0)];
        let s = suggest(expected(), &cycles, Money::ZERO, None).unwrap();
        assert_eq!(s.reason, SuggestionReason::MissedPayments);
        assert_eq!(s.suggested_amount, Money::from_major(1_500));
        assert_eq!(s.urgency, Urgency::High);

        let cycles = vec![
            short(1, CycleStatus::NotPaid, 0),
            short(2, CycleStatus::NotPaid, 0),
            short(3, CycleStatus::NotPaid, 0),
        ];
        let s = suggest(expected(), &cycles, Money::ZERO, None).unwrap();
        assert_eq!(s.suggested_amount, Money::from_major(2_000));
    }

    #[test]
    fn test_catch_up_outranks_missed_payments() {
        let cycles = vec![
            short(1, CycleStatus::Partial, 800),
            short(2, CycleStatus::Underpaid, 800),
            short(3, CycleStatus::NotPaid, 0),
        ];
        let s = suggest(expected(), &cycles, Money::ZERO, None).unwrap();
        assert_eq!(s.reason, SuggestionReason::CatchUp);
        assert_eq!(s.suggested_amount, Money::from_major(1_200));
    }

    #[test]
    fn test_consistent_overpayment() {
        let mut cycles = vec![
            short(1, CycleStatus::Overpaid, 1_100),
            short(2, CycleStatus::PaidOnTime, 1_000),
            short(3, CycleStatus::PaidEarly, 1_300),
        ];
        cycles[0].amount_status = AmountStatus::Over;
        cycles[2].amount_status = AmountStatus::Over;

        let s = suggest(expected(), &cycles, Money::ZERO, None).unwrap();
        assert_eq!(s.reason, SuggestionReason::ConsistentOverpayment);
        assert_eq!(s.suggested_amount, Money::from_major(1_200));
        assert_eq!(s.urgency, Urgency::Low);
    }

    #[test]
    fn test_late_payment_reminder() {
        let mut cycles = vec![
            short(1, CycleStatus::PaidLate, 1_000),
            short(2, CycleStatus::PaidLate, 1_000),
            on_time(3),
        ];
        cycles[0].timing_status = TimingStatus::Late;
        cycles[1].timing_status = TimingStatus::Late;

        let s = suggest(expected(), &cycles, Money::ZERO, None).unwrap();
        assert_eq!(s.reason, SuggestionReason::LatePaymentReminder);
        assert_eq!(s.suggested_amount, expected());
        assert_eq!(s.urgency, Urgency::Medium);
    }

    #[test]
    fn test_high_interest() {
        let cycles = vec![on_time(1)];
        let s = suggest(expected(), &cycles, Money::from_major(20_000), Some(Rate::from_percentage(18))).unwrap();
        assert_eq!(s.reason, SuggestionReason::HighInterest);
        assert_eq!(s.suggested_amount, Money::from_major(1_200));

        // exactly ten percent is not high
        let s = suggest(expected(), &cycles, Money::from_major(20_000), Some(Rate::from_percentage(10))).unwrap();
        assert_eq!(s.reason, SuggestionReason::Standard);
    }

    #[test]
    fn test_near_payoff_rounds_balance_up() {
        let cycles = vec![on_time(1)];
        let s = suggest(expected(), &cycles, Money::from_decimal(dec!(1234.01)), None).unwrap();
        assert_eq!(s.reason, SuggestionReason::NearPayoff);
        assert_eq!(s.suggested_amount, Money::from_major(1_235));
        assert_eq!(s.urgency, Urgency::Low);
    }

    #[test]
    fn test_standard_without_balance() {
        let cycles = vec![on_time(1), on_time(2)];
        let s = suggest(expected(), &cycles, Money::ZERO, None).unwrap();
        assert_eq!(s.reason, SuggestionReason::Standard);
        assert_eq!(s.suggested_amount, expected());
    }
}
