//! Normalization of frequency vocabularies.
//!
//! UI tokens (`"Monthly"`), database tokens (`"months"`), and custom units
//! all collapse into one [`CanonicalUnit`] plus an interval multiplier.
//! Unknown tokens resolve to monthly so a typo never yields an unbounded
//! schedule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// canonical recurrence unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalUnit {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl CanonicalUnit {
    /// number of periods per year, used to derive per-period interest
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CanonicalUnit::Daily => 365,
            CanonicalUnit::Weekly => 52,
            CanonicalUnit::Monthly => 12,
            CanonicalUnit::Quarterly => 4,
            CanonicalUnit::Yearly => 1,
        }
    }

    /// calendar months in one period, for month-based units
    pub fn months(&self) -> Option<u32> {
        match self {
            CanonicalUnit::Monthly => Some(1),
            CanonicalUnit::Quarterly => Some(3),
            CanonicalUnit::Yearly => Some(12),
            CanonicalUnit::Daily | CanonicalUnit::Weekly => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalUnit::Daily => "daily",
            CanonicalUnit::Weekly => "weekly",
            CanonicalUnit::Monthly => "monthly",
            CanonicalUnit::Quarterly => "quarterly",
            CanonicalUnit::Yearly => "yearly",
        }
    }
}

impl fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// unit as stored on a recurrence definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceUnit {
    Day,
    Week,
    Month,
    Quarter,
    Year,
    Custom,
}

impl FromStr for RecurrenceUnit {
    type Err = std::convert::Infallible;

    /// never fails: anything unrecognized is treated as a custom unit
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if normalize_token(s) == "custom" {
            return Ok(RecurrenceUnit::Custom);
        }
        let unit = match lookup(s) {
            Some((CanonicalUnit::Daily, 1)) => RecurrenceUnit::Day,
            Some((CanonicalUnit::Weekly, 1)) => RecurrenceUnit::Week,
            Some((CanonicalUnit::Monthly, 1)) => RecurrenceUnit::Month,
            Some((CanonicalUnit::Quarterly, 1)) => RecurrenceUnit::Quarter,
            Some((CanonicalUnit::Yearly, 1)) => RecurrenceUnit::Year,
            _ => RecurrenceUnit::Custom,
        };
        Ok(unit)
    }
}

/// canonical unit together with its interval multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub unit: CanonicalUnit,
    pub interval: u32,
}

impl Frequency {
    pub fn new(unit: CanonicalUnit, interval: u32) -> Self {
        Self {
            unit,
            interval: interval.max(1),
        }
    }

    pub fn monthly() -> Self {
        Self::new(CanonicalUnit::Monthly, 1)
    }

    /// resolve a definition's unit, honouring the custom unit/interval pair
    pub fn from_definition(
        unit: RecurrenceUnit,
        interval: u32,
        custom_unit: Option<&str>,
        custom_interval: Option<u32>,
    ) -> Self {
        let base = match unit {
            RecurrenceUnit::Day => (CanonicalUnit::Daily, 1),
            RecurrenceUnit::Week => (CanonicalUnit::Weekly, 1),
            RecurrenceUnit::Month => (CanonicalUnit::Monthly, 1),
            RecurrenceUnit::Quarter => (CanonicalUnit::Quarterly, 1),
            RecurrenceUnit::Year => (CanonicalUnit::Yearly, 1),
            RecurrenceUnit::Custom => {
                let token = custom_unit.unwrap_or("");
                let resolved = resolve_with_multiplier(token);
                return Self::new(
                    resolved.unit,
                    resolved
                        .interval
                        .saturating_mul(custom_interval.unwrap_or(interval).max(1)),
                );
            }
        };
        Self::new(base.0, (base.1 as u32).saturating_mul(interval.max(1)))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interval == 1 {
            write!(f, "{}", self.unit)
        } else {
            write!(f, "every {} x {}", self.interval, self.unit)
        }
    }
}

/// resolve a unit token, falling back to the custom unit when the token is `custom`
pub fn resolve(unit: &str, custom_unit: Option<&str>) -> CanonicalUnit {
    let token = normalize_token(unit);
    if token == "custom" {
        return resolve(custom_unit.unwrap_or(""), None);
    }
    resolve_with_multiplier(&token).unit
}

/// resolve a token to a unit and the multiplier it implies (`biweekly` -> weekly x 2)
pub fn resolve_with_multiplier(token: &str) -> Frequency {
    match lookup(token) {
        Some((unit, multiplier)) => Frequency::new(unit, multiplier),
        None => {
            debug!(token, "unrecognized frequency token, falling back to monthly");
            Frequency::monthly()
        }
    }
}

fn normalize_token(token: &str) -> String {
    token
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
}

fn lookup(token: &str) -> Option<(CanonicalUnit, u32)> {
    let unit = match normalize_token(token).as_str() {
        "d" | "day" | "days" | "daily" => (CanonicalUnit::Daily, 1),
        "w" | "week" | "weeks" | "weekly" => (CanonicalUnit::Weekly, 1),
        "biweekly" | "bi_weekly" | "fortnight" | "fortnightly" => (CanonicalUnit::Weekly, 2),
        "m" | "month" | "months" | "monthly" => (CanonicalUnit::Monthly, 1),
        "bimonthly" | "bi_monthly" => (CanonicalUnit::Monthly, 2),
        "semiannual" | "semi_annual" | "semiannually" | "semi_annually" | "half_yearly"
        | "half_year" => (CanonicalUnit::Monthly, 6),
        "q" | "quarter" | "quarters" | "quarterly" => (CanonicalUnit::Quarterly, 1),
        "y" | "year" | "years" | "yearly" | "annual" | "annually" => (CanonicalUnit::Yearly, 1),
        _ => return None,
    };
    Some(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelling_variants() {
        for token in ["day", "days", "daily", "Daily", " DAYS "] {
            assert_eq!(resolve(token, None), CanonicalUnit::Daily, "{token}");
        }
        assert_eq!(resolve("weeks", None), CanonicalUnit::Weekly);
        assert_eq!(resolve("Quarterly", None), CanonicalUnit::Quarterly);
        assert_eq!(resolve("annually", None), CanonicalUnit::Yearly);
    }

    #[test]
    fn test_custom_unit_resolves_through_same_table() {
        assert_eq!(resolve("custom", Some("weeks")), CanonicalUnit::Weekly);
        assert_eq!(resolve("custom", Some("years")), CanonicalUnit::Yearly);
    }

    #[test]
    fn test_unknown_falls_back_to_monthly() {
        assert_eq!(resolve("lunar_cycle", None), CanonicalUnit::Monthly);
        assert_eq!(resolve("custom", None), CanonicalUnit::Monthly);
        assert_eq!(resolve("", None), CanonicalUnit::Monthly);
    }

    #[test]
    fn test_compound_tokens_carry_multiplier() {
        assert_eq!(
            resolve_with_multiplier("bi-weekly"),
            Frequency::new(CanonicalUnit::Weekly, 2)
        );
        assert_eq!(
            resolve_with_multiplier("semi annually"),
            Frequency::new(CanonicalUnit::Monthly, 6)
        );
    }

    #[test]
    fn test_from_definition() {
        let f = Frequency::from_definition(RecurrenceUnit::Week, 2, None, None);
        assert_eq!(f, Frequency::new(CanonicalUnit::Weekly, 2));

        let f = Frequency::from_definition(RecurrenceUnit::Custom, 1, Some("fortnightly"), Some(3));
        assert_eq!(f, Frequency::new(CanonicalUnit::Weekly, 6));

        // zero interval is normalized rather than looping forever
        let f = Frequency::from_definition(RecurrenceUnit::Month, 0, None, None);
        assert_eq!(f.interval, 1);
    }

    #[test]
    fn test_from_definition_saturates_huge_intervals() {
        let f = Frequency::from_definition(RecurrenceUnit::Custom, 1, Some("biweekly"), Some(u32::MAX / 2 + 1));
        assert_eq!(f, Frequency::new(CanonicalUnit::Weekly, u32::MAX));

        let f = Frequency::from_definition(RecurrenceUnit::Month, u32::MAX, None, None);
        assert_eq!(f.interval, u32::MAX);
    }

    #[test]
    fn test_recurrence_unit_from_str() {
        assert_eq!("months".parse::<RecurrenceUnit>().unwrap(), RecurrenceUnit::Month);
        assert_eq!("Custom".parse::<RecurrenceUnit>().unwrap(), RecurrenceUnit::Custom);
        assert_eq!("biweekly".parse::<RecurrenceUnit>().unwrap(), RecurrenceUnit::Custom);
    }

    #[test]
    fn test_periods_per_year() {
        assert_eq!(CanonicalUnit::Daily.periods_per_year(), 365);
        assert_eq!(CanonicalUnit::Weekly.periods_per_year(), 52);
        assert_eq!(CanonicalUnit::Quarterly.periods_per_year(), 4);
    }
}
