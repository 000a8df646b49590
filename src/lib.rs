pub mod calendar;
pub mod config;
pub mod cycles;
pub mod decimal;
pub mod errors;
pub mod frequency;
pub mod interest;
pub mod payments;
pub mod schedule;
pub mod serialization;
pub mod types;

#[cfg(test)]
mod testing;

// re-export key types
pub use config::{
    AmortizationTerms, CycleOptions, EngineLimits, MatchOptions, Obligation, ObligationKind,
    RecurrenceDefinition, ScheduleWindow,
};
pub use cycles::{
    calculate_statistics, current_cycle, generate_cycles, next_cycle, next_due_cycle, Cycle,
    CycleCursor, CycleStatistics,
};
pub use decimal::{Money, Rate};
pub use errors::{ObligationError, Result};
pub use frequency::{resolve, resolve_with_multiplier, CanonicalUnit, Frequency, RecurrenceUnit};
pub use interest::{BalanceState, PeriodSplit, ReducingBalance};
pub use payments::{
    match_transactions_to_cycles, reconcile, suggest, AmortizationCalculator, AmortizationEntry,
    AmortizationSchedule, LoanTerm, MatchReport, PaymentSuggestion, PaymentTransaction,
    RateSolution, SolverTermination, TransactionMetadata,
};
pub use schedule::{generate_schedule, next_occurrence, Occurrence, Schedule};
pub use serialization::ObligationView;
pub use types::{
    AmountStatus, CycleKey, CycleStatus, ObligationId, OccurrenceStatus, SuggestionReason,
    TimingStatus, Urgency,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
