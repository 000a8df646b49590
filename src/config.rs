use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycles::Cycle;
use crate::decimal::{Money, Rate};
use crate::errors::{ObligationError, Result};
use crate::frequency::{Frequency, RecurrenceUnit};
use crate::types::{CycleKey, ObligationId};

pub const DEFAULT_MAX_CYCLES: u32 = 12;
pub const DEFAULT_TOLERANCE_DAYS: u32 = 2;

/// safety caps bounding every loop in the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLimits {
    pub max_cycle_iterations: u32,
    pub max_schedule_occurrences: usize,
    pub max_amortization_periods: u32,
    pub max_solver_iterations: u32,
}

impl EngineLimits {
    pub const MAX_CYCLE_ITERATIONS: u32 = 1_000;
    pub const MAX_SCHEDULE_OCCURRENCES: usize = 10_000;
    pub const MAX_AMORTIZATION_PERIODS: u32 = 600;
    pub const MAX_SOLVER_ITERATIONS: u32 = 100;
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_cycle_iterations: Self::MAX_CYCLE_ITERATIONS,
            max_schedule_occurrences: Self::MAX_SCHEDULE_OCCURRENCES,
            max_amortization_periods: Self::MAX_AMORTIZATION_PERIODS,
            max_solver_iterations: Self::MAX_SOLVER_ITERATIONS,
        }
    }
}

/// recurrence parameters as stored by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceDefinition {
    pub unit: RecurrenceUnit,
    pub interval: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// day-of-month for month/quarter, weekday (0 = sunday) for week, day-of-year for year
    pub day_of_occurrence: Option<u32>,
    pub custom_unit: Option<String>,
    pub custom_interval: Option<u32>,
}

impl RecurrenceDefinition {
    pub fn new(unit: RecurrenceUnit, interval: u32, start_date: NaiveDate) -> Self {
        Self {
            unit,
            interval,
            start_date,
            end_date: None,
            day_of_occurrence: None,
            custom_unit: None,
            custom_interval: None,
        }
    }

    pub fn monthly(start_date: NaiveDate) -> Self {
        Self::new(RecurrenceUnit::Month, 1, start_date)
    }

    pub fn custom(unit: &str, interval: u32, start_date: NaiveDate) -> Self {
        Self {
            custom_unit: Some(unit.to_string()),
            custom_interval: Some(interval),
            ..Self::new(RecurrenceUnit::Custom, 1, start_date)
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn on_day(mut self, day: u32) -> Self {
        self.day_of_occurrence = Some(day);
        self
    }

    /// canonical unit and interval
    pub fn frequency(&self) -> Frequency {
        Frequency::from_definition(
            self.unit,
            self.interval,
            self.custom_unit.as_deref(),
            self.custom_interval,
        )
    }

    pub fn validate(&self) -> Result<()> {
        validate_interval(self.interval)?;
        if let Some(custom_interval) = self.custom_interval {
            validate_interval(custom_interval)?;
        }
        validate_range(self.start_date, self.end_date)
    }
}

/// amortization parameters for balance-bearing obligations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationTerms {
    pub annual_rate: Rate,
    pub starting_balance: Money,
    pub interest_included: bool,
}

impl AmortizationTerms {
    pub fn new(annual_rate: Rate, starting_balance: Money) -> Self {
        Self {
            annual_rate,
            starting_balance,
            interest_included: true,
        }
    }

    /// the payment is applied entirely to principal, interest is billed separately
    pub fn interest_excluded(mut self) -> Self {
        self.interest_included = false;
        self
    }
}

/// input to cycle generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOptions {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub frequency: Frequency,
    pub day_of_occurrence: Option<u32>,
    pub expected_amount: Money,
    pub minimum_amount: Option<Money>,
    pub max_cycles: u32,
    pub amortization: Option<AmortizationTerms>,
    #[serde(default)]
    pub limits: EngineLimits,
}

impl CycleOptions {
    pub fn new(start_date: NaiveDate, frequency: Frequency, expected_amount: Money) -> Self {
        Self {
            start_date,
            end_date: None,
            frequency,
            day_of_occurrence: None,
            expected_amount,
            minimum_amount: None,
            max_cycles: DEFAULT_MAX_CYCLES,
            amortization: None,
            limits: EngineLimits::default(),
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn on_day(mut self, day: u32) -> Self {
        self.day_of_occurrence = Some(day);
        self
    }

    pub fn max_cycles(mut self, max_cycles: u32) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_minimum(mut self, minimum: Money) -> Self {
        self.minimum_amount = Some(minimum);
        self
    }

    pub fn amortized(mut self, terms: AmortizationTerms) -> Self {
        self.amortization = Some(terms);
        self
    }

    pub fn with_limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_interval(self.frequency.interval)?;
        validate_range(self.start_date, self.end_date)?;
        validate_amount("expected_amount", self.expected_amount)?;
        if let Some(minimum) = self.minimum_amount {
            validate_amount("minimum_amount", minimum)?;
        }
        if let Some(terms) = &self.amortization {
            validate_amount("starting_balance", terms.starting_balance)?;
            if terms.annual_rate.as_decimal().is_sign_negative() {
                return Err(ObligationError::InvalidConfiguration {
                    message: format!("negative interest rate {}", terms.annual_rate),
                });
            }
        }
        Ok(())
    }
}

/// tolerances for reconciling transactions against cycles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    pub tolerance_days: u32,
    pub amount_tolerance: Rate,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            tolerance_days: DEFAULT_TOLERANCE_DAYS,
            amount_tolerance: Rate::from_decimal(dec!(0.01)),
        }
    }
}

/// bounds for unrolling an occurrence schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScheduleWindow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub max_occurrences: Option<usize>,
    #[serde(default)]
    pub limits: EngineLimits,
}

impl ScheduleWindow {
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    pub fn first(max_occurrences: usize) -> Self {
        Self {
            max_occurrences: Some(max_occurrences),
            ..Self::default()
        }
    }
}

/// kind of obligation, informational for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    Subscription,
    Bill,
    Loan,
    Goal,
}

/// obligation record as handed over by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: ObligationId,
    pub name: String,
    pub kind: ObligationKind,
    pub definition: RecurrenceDefinition,
    pub payment_amount: Money,
    pub minimum_payment: Option<Money>,
    pub currency: String,
    pub category_id: Option<String>,
    pub linked_account_id: Option<String>,
    pub amortization: Option<AmortizationTerms>,
    pub max_cycles: u32,
}

impl Obligation {
    /// create subscription configuration
    pub fn subscription(
        name: &str,
        amount: Money,
        definition: RecurrenceDefinition,
        currency: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: ObligationKind::Subscription,
            definition,
            payment_amount: amount,
            minimum_payment: None,
            currency: currency.to_string(),
            category_id: None,
            linked_account_id: None,
            amortization: None,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }

    /// create bill configuration with an optional minimum payment (e.g. a credit card)
    pub fn bill(
        name: &str,
        amount: Money,
        minimum_payment: Option<Money>,
        definition: RecurrenceDefinition,
        currency: &str,
    ) -> Self {
        Self {
            kind: ObligationKind::Bill,
            minimum_payment,
            ..Self::subscription(name, amount, definition, currency)
        }
    }

    /// create loan configuration; cycles run until the balance is repaid
    pub fn loan(
        name: &str,
        principal: Money,
        annual_rate: Rate,
        payment: Money,
        definition: RecurrenceDefinition,
        currency: &str,
    ) -> Self {
        Self {
            kind: ObligationKind::Loan,
            amortization: Some(AmortizationTerms::new(annual_rate, principal)),
            max_cycles: EngineLimits::MAX_AMORTIZATION_PERIODS,
            ..Self::subscription(name, payment, definition, currency)
        }
    }

    pub fn with_category(mut self, category_id: &str) -> Self {
        self.category_id = Some(category_id.to_string());
        self
    }

    pub fn with_linked_account(mut self, account_id: &str) -> Self {
        self.linked_account_id = Some(account_id.to_string());
        self
    }

    /// derive the cycle generator input from this record
    pub fn cycle_options(&self) -> Result<CycleOptions> {
        self.definition.validate()?;
        let options = CycleOptions {
            start_date: self.definition.start_date,
            end_date: self.definition.end_date,
            frequency: self.definition.frequency(),
            day_of_occurrence: self.definition.day_of_occurrence,
            expected_amount: self.payment_amount,
            minimum_amount: self.minimum_payment,
            max_cycles: self.max_cycles,
            amortization: self.amortization,
            limits: EngineLimits::default(),
        };
        options.validate()?;
        Ok(options)
    }

    /// key the caller uses to create at most one record per cycle
    pub fn cycle_key(&self, cycle: &Cycle) -> CycleKey {
        CycleKey {
            obligation_id: self.id,
            cycle_number: cycle.cycle_number,
        }
    }
}

fn validate_interval(interval: u32) -> Result<()> {
    if interval < 1 {
        return Err(ObligationError::InvalidInterval { interval });
    }
    Ok(())
}

fn validate_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<()> {
    match end {
        Some(end) if end < start => Err(ObligationError::EndBeforeStart { start, end }),
        _ => Ok(()),
    }
}

fn validate_amount(field: &'static str, amount: Money) -> Result<()> {
    if amount.is_negative() {
        return Err(ObligationError::NegativeAmount { field, amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::CanonicalUnit;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_definition_validation() {
        let def = RecurrenceDefinition::new(RecurrenceUnit::Month, 0, d(2024, 1, 1));
        assert_eq!(
            def.validate(),
            Err(ObligationError::InvalidInterval { interval: 0 })
        );

        let def = RecurrenceDefinition::monthly(d(2024, 3, 1)).until(d(2024, 2, 1));
        assert!(matches!(
            def.validate(),
            Err(ObligationError::EndBeforeStart { .. })
        ));

        let def = RecurrenceDefinition::monthly(d(2024, 3, 1)).until(d(2024, 3, 1));
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_valid_custom_definition_with_huge_interval() {
        let def = RecurrenceDefinition::custom("biweekly", u32::MAX / 2 + 1, d(2024, 1, 1));
        assert!(def.validate().is_ok());
        assert_eq!(def.frequency().unit, CanonicalUnit::Weekly);
        assert_eq!(def.frequency().interval, u32::MAX);
    }

    #[test]
    fn test_negative_expected_amount_rejected() {
        let options = CycleOptions::new(d(2024, 1, 1), Frequency::monthly(), Money::from_major(-5));
        assert_eq!(
            options.validate(),
            Err(ObligationError::NegativeAmount {
                field: "expected_amount",
                amount: Money::from_major(-5),
            })
        );
    }

    #[test]
    fn test_default_limits() {
        let limits = EngineLimits::default();
        assert_eq!(limits.max_cycle_iterations, 1_000);
        assert_eq!(limits.max_schedule_occurrences, 10_000);
        assert_eq!(limits.max_amortization_periods, 600);
        assert_eq!(limits.max_solver_iterations, 100);

        let options = MatchOptions::default();
        assert_eq!(options.tolerance_days, 2);
        assert_eq!(options.amount_tolerance.as_decimal(), dec!(0.01));
    }

    #[test]
    fn test_loan_preset_to_cycle_options() {
        let loan = Obligation::loan(
            "car",
            Money::from_major(12_000),
            Rate::from_percentage(12),
            Money::from_major(1_000),
            RecurrenceDefinition::monthly(d(2024, 1, 1)).on_day(5),
            "USD",
        )
        .with_linked_account("checking");

        let options = loan.cycle_options().unwrap();
        assert_eq!(options.frequency.unit, CanonicalUnit::Monthly);
        assert_eq!(options.day_of_occurrence, Some(5));
        assert_eq!(options.expected_amount, Money::from_major(1_000));
        let terms = options.amortization.unwrap();
        assert_eq!(terms.starting_balance, Money::from_major(12_000));
        assert!(terms.interest_included);
    }

    #[test]
    fn test_options_round_trip_json() {
        let options = CycleOptions::new(d(2024, 1, 1), Frequency::monthly(), Money::from_major(50))
            .with_minimum(Money::from_major(25))
            .max_cycles(6);
        let json = serde_json::to_string(&options).unwrap();
        let parsed: CycleOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
