pub mod reducing_balance;

use rust_decimal::Decimal;

pub use reducing_balance::{BalanceState, PeriodSplit, ReducingBalance, SETTLED_BALANCE};

/// (1 + rate)^periods by repeated multiplication, `None` on overflow
pub fn compound_factor(rate: Decimal, periods: u32) -> Option<Decimal> {
    let base = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor.checked_mul(base)?;
    }
    Some(factor)
}

/// level payment that retires `principal` over `periods` at `period_rate`
pub fn annuity_payment(principal: Decimal, period_rate: Decimal, periods: u32) -> Decimal {
    if periods == 0 {
        return principal;
    }
    if period_rate.is_zero() {
        return principal / Decimal::from(periods);
    }

    // payment = P * r * (1 + r)^n / ((1 + r)^n - 1)
    match compound_factor(period_rate, periods) {
        Some(compound) if compound > Decimal::ONE => {
            principal * period_rate * compound / (compound - Decimal::ONE)
        }
        // factor too large to represent: the payment converges to pure interest
        _ => principal * period_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_factor() {
        assert_eq!(compound_factor(dec!(0.1), 2), Some(dec!(1.21)));
        assert_eq!(compound_factor(dec!(0.5), 0), Some(Decimal::ONE));
        assert_eq!(compound_factor(dec!(1000), 100), None);
    }

    #[test]
    fn test_annuity_payment() {
        let payment = annuity_payment(dec!(12000), dec!(0.01), 12);
        assert_eq!(payment.round_dp(2), dec!(1066.19));

        assert_eq!(annuity_payment(dec!(1200), Decimal::ZERO, 12), dec!(100));
        assert_eq!(annuity_payment(dec!(1200), dec!(0.01), 0), dec!(1200));
    }
}
