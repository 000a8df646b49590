//! serialization support for obligations

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::{Obligation, ObligationKind};
use crate::cycles::{calculate_statistics, current_cycle, next_due_cycle, Cycle, CycleStatistics};
use crate::decimal::{Money, Rate};
use crate::frequency::Frequency;
use crate::payments::{suggest, PaymentSuggestion};
use crate::types::{CycleStatus, ObligationId};

/// serializable view of an obligation and its reconciled cycles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObligationView {
    pub id: ObligationId,
    pub name: String,
    pub kind: ObligationKind,
    pub currency: String,
    pub category_id: Option<String>,
    pub linked_account_id: Option<String>,
    pub as_of: NaiveDate,
    pub schedule: ScheduleView,
    pub balance: Option<BalanceView>,
    pub cycles: Vec<Cycle>,
    pub statistics: CycleStatistics,
    pub suggestion: Option<PaymentSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub payment_amount: Money,
    pub minimum_payment: Option<Money>,
    pub current_cycle: Option<u32>,
    pub next_due_date: Option<NaiveDate>,
    pub next_due_amount: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    pub starting_balance: Money,
    /// starting balance less the principal actually paid
    pub outstanding_balance: Money,
    /// balance the last elapsed cycle expected to leave
    pub scheduled_balance: Money,
    pub annual_rate: Rate,
    pub interest_included: bool,
}

impl ObligationView {
    /// project `cycles` (already matched) for display as of the provider's today
    pub fn from_cycles(obligation: &Obligation, cycles: &[Cycle], time_provider: &SafeTimeProvider) -> Self {
        let today = time_provider.now().date_naive();
        let history: Vec<Cycle> = cycles
            .iter()
            .filter(|c| c.status != CycleStatus::Upcoming)
            .cloned()
            .collect();

        let balance = obligation.amortization.map(|terms| {
            let principal_paid: Money = cycles.iter().filter_map(|c| c.actual_principal).sum();
            BalanceView {
                starting_balance: terms.starting_balance,
                outstanding_balance: (terms.starting_balance - principal_paid).max(Money::ZERO),
                scheduled_balance: history
                    .last()
                    .and_then(|c| c.remaining_balance)
                    .unwrap_or(terms.starting_balance),
                annual_rate: terms.annual_rate,
                interest_included: terms.interest_included,
            }
        });
        let next_due = next_due_cycle(cycles, today);

        ObligationView {
            id: obligation.id,
            name: obligation.name.clone(),
            kind: obligation.kind,
            currency: obligation.currency.clone(),
            category_id: obligation.category_id.clone(),
            linked_account_id: obligation.linked_account_id.clone(),
            as_of: today,
            schedule: ScheduleView {
                frequency: obligation.definition.frequency(),
                start_date: obligation.definition.start_date,
                end_date: obligation.definition.end_date,
                payment_amount: obligation.payment_amount,
                minimum_payment: obligation.minimum_payment,
                current_cycle: current_cycle(cycles, today).map(|c| c.cycle_number),
                next_due_date: next_due.map(|c| c.expected_date),
                next_due_amount: next_due.map(|c| c.expected_amount),
            },
            suggestion: suggest(
                obligation.payment_amount,
                &history,
                balance.as_ref().map_or(Money::ZERO, |b| b.outstanding_balance),
                balance.as_ref().map(|b| b.annual_rate),
            ),
            balance,
            statistics: calculate_statistics(cycles),
            cycles: cycles.to_vec(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
