pub mod amortization;
pub mod matching;
pub mod suggestion;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

pub use amortization::{
    AmortizationCalculator, AmortizationEntry, AmortizationSchedule, LoanTerm, RateSolution,
    SolverTermination,
};
pub use matching::{match_transactions_to_cycles, reconcile, MatchReport};
pub use suggestion::{suggest, PaymentSuggestion};

/// optional annotations a transaction can carry from the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub principal: Option<Money>,
    pub interest: Option<Money>,
    /// cycle the payer explicitly assigned this payment to
    pub cycle_number: Option<u32>,
}

/// payment transaction fetched from the ledger for reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub amount: Money,
    #[serde(default)]
    pub metadata: Option<TransactionMetadata>,
}

impl PaymentTransaction {
    pub fn new(date: DateTime<Utc>, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            amount,
            metadata: None,
        }
    }

    /// attribute the payment to a specific cycle regardless of its date
    pub fn for_cycle(mut self, cycle_number: u32) -> Self {
        self.metadata.get_or_insert_with(Default::default).cycle_number = Some(cycle_number);
        self
    }

    /// record how the ledger split the payment
    pub fn with_split(mut self, principal: Money, interest: Money) -> Self {
        let metadata = self.metadata.get_or_insert_with(Default::default);
        metadata.principal = Some(principal);
        metadata.interest = Some(interest);
        self
    }

    /// calendar date of the payment, time of day dropped
    pub fn value_date(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn cycle_number(&self) -> Option<u32> {
        self.metadata.and_then(|m| m.cycle_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_date_drops_time_of_day() {
        let tx = PaymentTransaction::new(
            Utc.with_ymd_and_hms(2024, 3, 12, 23, 59, 59).unwrap(),
            Money::from_major(1_000),
        );
        assert_eq!(tx.value_date(), NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        assert_eq!(tx.cycle_number(), None);
    }

    #[test]
    fn test_metadata_builders_compose() {
        let tx = PaymentTransaction::new(Utc.with_ymd_and_hms(2024, 3, 12, 0, 0, 0).unwrap(), Money::from_major(500))
            .for_cycle(3)
            .with_split(Money::from_major(450), Money::from_major(50));

        let metadata = tx.metadata.unwrap();
        assert_eq!(metadata.cycle_number, Some(3));
        assert_eq!(metadata.principal, Some(Money::from_major(450)));
        assert_eq!(metadata.interest, Some(Money::from_major(50)));
    }

    #[test]
    fn test_transaction_json_without_metadata() {
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "date": "2024-03-12T10:00:00Z",
            "amount": "1000.00"
        }"#;
        let tx: PaymentTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, Money::from_major(1_000));
        assert!(tx.metadata.is_none());
    }
}
