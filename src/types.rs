use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for an obligation
pub type ObligationId = Uuid;

/// idempotency key for anything the caller creates per cycle (bills, reminders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CycleKey {
    pub obligation_id: ObligationId,
    pub cycle_number: u32,
}

/// composite cycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// no payment yet and the cycle has not ended
    #[default]
    Upcoming,
    /// cycle ended without any payment
    NotPaid,
    PaidEarly,
    PaidOnTime,
    PaidWithinWindow,
    PaidLate,
    /// paid on the due date with more than expected
    Overpaid,
    /// short of the expected amount but still correctable
    Partial,
    /// short of the expected amount and outside the window
    Underpaid,
}

impl CycleStatus {
    /// statuses that count as a settled cycle
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            CycleStatus::PaidEarly
                | CycleStatus::PaidOnTime
                | CycleStatus::PaidWithinWindow
                | CycleStatus::PaidLate
                | CycleStatus::Overpaid
        )
    }

    /// statuses that extend a streak
    pub fn is_good(&self) -> bool {
        matches!(
            self,
            CycleStatus::PaidOnTime
                | CycleStatus::PaidEarly
                | CycleStatus::PaidWithinWindow
                | CycleStatus::Overpaid
        )
    }

    pub fn is_short(&self) -> bool {
        matches!(self, CycleStatus::Partial | CycleStatus::Underpaid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Upcoming => "upcoming",
            CycleStatus::NotPaid => "not_paid",
            CycleStatus::PaidEarly => "paid_early",
            CycleStatus::PaidOnTime => "paid_on_time",
            CycleStatus::PaidWithinWindow => "paid_within_window",
            CycleStatus::PaidLate => "paid_late",
            CycleStatus::Overpaid => "overpaid",
            CycleStatus::Partial => "partial",
            CycleStatus::Underpaid => "underpaid",
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// timing axis of a cycle classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingStatus {
    #[default]
    None,
    Early,
    OnTime,
    WithinWindow,
    Late,
}

/// amount axis of a cycle classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmountStatus {
    #[default]
    None,
    Over,
    Target,
    Partial,
    BelowMinimum,
    MinimumMet,
}

impl AmountStatus {
    /// amount states that settle the cycle
    pub fn is_sufficient(&self) -> bool {
        matches!(
            self,
            AmountStatus::Over | AmountStatus::Target | AmountStatus::MinimumMet
        )
    }
}

/// status of a scheduled occurrence relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Upcoming,
    DueToday,
    Overdue,
}

/// why a payment amount was suggested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionReason {
    FirstPayment,
    CatchUp,
    MissedPayments,
    ConsistentOverpayment,
    LatePaymentReminder,
    HighInterest,
    NearPayoff,
    Standard,
}

/// urgency tier of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_groups() {
        assert!(CycleStatus::PaidLate.is_paid());
        assert!(!CycleStatus::PaidLate.is_good());
        assert!(CycleStatus::Overpaid.is_good());
        assert!(!CycleStatus::Partial.is_paid());
        assert!(CycleStatus::Underpaid.is_short());
        assert!(!CycleStatus::Upcoming.is_good());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&CycleStatus::PaidWithinWindow).unwrap();
        assert_eq!(json, "\"paid_within_window\"");
        assert_eq!(CycleStatus::PaidWithinWindow.to_string(), "paid_within_window");

        let reason: SuggestionReason = serde_json::from_str("\"late_payment_reminder\"").unwrap();
        assert_eq!(reason, SuggestionReason::LatePaymentReminder);
    }
}
