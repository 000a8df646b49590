use chrono::NaiveDate;
use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObligationError {
    #[error("invalid interval: {interval} (must be at least 1)")]
    InvalidInterval {
        interval: u32,
    },

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("negative amount for {field}: {amount}")]
    NegativeAmount {
        field: &'static str,
        amount: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    /// generated cycles overlapped, repeated or left a gap
    #[error("cycle sequence violated at cycle {cycle_number}: {message}")]
    CycleSequenceViolation {
        cycle_number: u32,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ObligationError>;
