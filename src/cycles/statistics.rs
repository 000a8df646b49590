use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::cycles::Cycle;
use crate::types::{CycleStatus, TimingStatus};

/// aggregate payment behaviour over a run of cycles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CycleStatistics {
    pub total: u32,
    pub paid: u32,
    pub not_paid: u32,
    pub upcoming: u32,
    pub partial: u32,
    pub underpaid: u32,
    /// timing buckets, counted over paid cycles
    pub early: u32,
    pub on_time: u32,
    pub within_window: u32,
    pub late: u32,
    /// paid over total, in percent
    pub completion_rate: Decimal,
    /// early, on time or within window over paid (not total), in percent
    pub on_time_rate: Decimal,
    /// cycles paid inside the tolerance window over cycles with any payment, in percent
    pub window_compliance_rate: Decimal,
    /// consecutive good cycles counting back from the most recent settled one
    pub current_streak: u32,
}

pub fn calculate_statistics(cycles: &[Cycle]) -> CycleStatistics {
    let mut stats = CycleStatistics {
        total: cycles.len() as u32,
        ..CycleStatistics::default()
    };
    let mut inside_window = 0u32;
    let mut outside_window = 0u32;

    for cycle in cycles {
        match cycle.status {
            CycleStatus::NotPaid => stats.not_paid += 1,
            CycleStatus::Upcoming => stats.upcoming += 1,
            CycleStatus::Partial => stats.partial += 1,
            CycleStatus::Underpaid => stats.underpaid += 1,
            _ => {}
        }

        if cycle.is_paid() {
            stats.paid += 1;
            match cycle.timing_status {
                TimingStatus::Early => stats.early += 1,
                TimingStatus::OnTime => stats.on_time += 1,
                TimingStatus::WithinWindow => stats.within_window += 1,
                TimingStatus::Late => stats.late += 1,
                TimingStatus::None => {}
            }
        }

        if cycle.has_payments() || !cycle.actual_amount.is_zero() {
            if cycle.is_within_window {
                inside_window += 1;
            } else {
                outside_window += 1;
            }
        }
    }

    stats.completion_rate = percentage(stats.paid, stats.total, Decimal::ZERO);
    stats.on_time_rate = percentage(
        stats.early + stats.on_time + stats.within_window,
        stats.paid,
        Decimal::ZERO,
    );
    stats.window_compliance_rate = percentage(inside_window, inside_window + outside_window, dec!(100));
    stats.current_streak = current_streak(cycles);
    stats
}

fn current_streak(cycles: &[Cycle]) -> u32 {
    cycles
        .iter()
        .rev()
        .filter(|c| c.status != CycleStatus::Upcoming)
        .take_while(|c| c.status.is_good())
        .count() as u32
}

fn percentage(part: u32, whole: u32, empty: Decimal) -> Decimal {
    if whole == 0 {
        return empty;
    }
    (Decimal::from(part) * dec!(100) / Decimal::from(whole)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use chrono::NaiveDate;

    fn cycle(n: u32, status: CycleStatus, timing: TimingStatus, within: bool) -> Cycle {
        let start = NaiveDate::from_ymd_opt(2024, n, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, n, 28).unwrap();
        let mut c = Cycle::new(n, start, end, start, Money::from_major(100));
        c.status = status;
        c.timing_status = timing;
        c.is_within_window = within;
        if timing != TimingStatus::None {
            c.actual_amount = Money::from_major(100);
            c.payment_count = 1;
        }
        c
    }

    #[test]
    fn test_empty_statistics() {
        let stats = calculate_statistics(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, Decimal::ZERO);
        assert_eq!(stats.on_time_rate, Decimal::ZERO);
        assert_eq!(stats.window_compliance_rate, dec!(100));
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn test_mixed_history() {
        let cycles = vec![
            cycle(1, CycleStatus::PaidOnTime, TimingStatus::OnTime, true),
            cycle(2, CycleStatus::PaidLate, TimingStatus::Late, false),
            cycle(3, CycleStatus::PaidWithinWindow, TimingStatus::WithinWindow, true),
            cycle(4, CycleStatus::NotPaid, TimingStatus::None, false),
            cycle(5, CycleStatus::Overpaid, TimingStatus::OnTime, true),
            cycle(6, CycleStatus::Upcoming, TimingStatus::None, false),
        ];
        let stats = calculate_statistics(&cycles);

        assert_eq!(stats.total, 6);
        assert_eq!(stats.paid, 4);
        assert_eq!(stats.not_paid, 1);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.on_time, 2);
        assert_eq!(stats.late, 1);
        assert_eq!(stats.within_window, 1);

        assert_eq!(stats.completion_rate, dec!(66.67));
        assert_eq!(stats.on_time_rate, dec!(75));
        assert_eq!(stats.window_compliance_rate, dec!(75));
        // upcoming is skipped, the overpaid cycle counts, the missed one stops the walk
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn test_rate_denominators_differ() {
        // completion is over all cycles, on-time only over paid ones
        let cycles = vec![
            cycle(1, CycleStatus::PaidOnTime, TimingStatus::OnTime, true),
            cycle(2, CycleStatus::NotPaid, TimingStatus::None, false),
            cycle(3, CycleStatus::NotPaid, TimingStatus::None, false),
            cycle(4, CycleStatus::NotPaid, TimingStatus::None, false),
        ];
        let stats = calculate_statistics(&cycles);

        assert_eq!(stats.completion_rate, dec!(25));
        assert_eq!(stats.on_time_rate, dec!(100));
    }

    #[test]
    fn test_streak_counts_consecutive_good_cycles() {
        let cycles = vec![
            cycle(1, CycleStatus::PaidLate, TimingStatus::Late, false),
            cycle(2, CycleStatus::PaidEarly, TimingStatus::Early, true),
            cycle(3, CycleStatus::PaidOnTime, TimingStatus::OnTime, true),
            cycle(4, CycleStatus::PaidWithinWindow, TimingStatus::WithinWindow, true),
            cycle(5, CycleStatus::Upcoming, TimingStatus::None, false),
        ];
        assert_eq!(calculate_statistics(&cycles).current_streak, 3);
    }

    #[test]
    fn test_partial_payments_count_toward_window_compliance() {
        let cycles = vec![
            cycle(1, CycleStatus::Partial, TimingStatus::OnTime, true),
            cycle(2, CycleStatus::Underpaid, TimingStatus::Late, false),
        ];
        let stats = calculate_statistics(&cycles);

        assert_eq!(stats.paid, 0);
        assert_eq!(stats.partial, 1);
        assert_eq!(stats.underpaid, 1);
        assert_eq!(stats.on_time_rate, Decimal::ZERO);
        assert_eq!(stats.window_compliance_rate, dec!(50));
        assert_eq!(stats.current_streak, 0);
    }
}
