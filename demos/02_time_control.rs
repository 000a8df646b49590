/// time control - deterministic reconciliation with controlled time
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use recurring_obligations_rs::{
    calculate_statistics, generate_cycles, generate_schedule, reconcile, suggest, MatchOptions,
    Money, Obligation, PaymentTransaction, RecurrenceDefinition, SafeTimeProvider, ScheduleWindow,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    // create controlled time for testing
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid date")?;
    let rent = Obligation::bill(
        "rent",
        Money::from_major(1_200),
        None,
        RecurrenceDefinition::monthly(start).on_day(1),
        "EUR",
    );
    let cycles = generate_cycles(&rent.cycle_options()?.max_cycles(6))?;

    // upcoming due dates as seen today
    let schedule = generate_schedule(&rent.definition, ScheduleWindow::first(3), &time);
    for occurrence in &schedule {
        println!("{} {:?} ({} days)", occurrence.date, occurrence.status, occurrence.days_from_now);
    }

    let payments = vec![
        PaymentTransaction::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(), Money::from_major(1_200)),
        PaymentTransaction::new(Utc.with_ymd_and_hms(2024, 2, 2, 9, 0, 0).unwrap(), Money::from_major(1_200)),
        PaymentTransaction::new(Utc.with_ymd_and_hms(2024, 3, 9, 9, 0, 0).unwrap(), Money::from_major(600)),
    ];

    // the same payments classify differently as time moves on
    for days in [45, 60, 60] {
        controller.advance(Duration::days(days));
        let report = reconcile(&cycles, &payments, &MatchOptions::default(), &time);
        let stats = calculate_statistics(&report.cycles);

        println!("\nas of {}", time.now().format("%Y-%m-%d"));
        for cycle in report.cycles.iter().filter(|c| c.start_date <= time.now().date_naive()) {
            println!("  cycle {} ({}): {}", cycle.cycle_number, cycle.expected_date, cycle.status);
        }
        println!(
            "  completion {}%, on time {}%, streak {}",
            stats.completion_rate, stats.on_time_rate, stats.current_streak
        );

        let history: Vec<_> = report
            .cycles
            .iter()
            .filter(|c| c.end_date < time.now().date_naive())
            .cloned()
            .collect();
        if let Some(suggestion) = suggest(rent.payment_amount, &history, Money::ZERO, None) {
            println!("  suggest ${} ({:?}): {}", suggestion.suggested_amount, suggestion.reason, suggestion.explanation);
        }
    }

    Ok(())
}
