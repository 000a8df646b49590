/// quick start - minimal example to get started
use recurring_obligations_rs::chrono::{NaiveDate, TimeZone, Utc};
use recurring_obligations_rs::{
    generate_cycles, match_transactions_to_cycles, MatchOptions, Money, Obligation, ObligationView,
    PaymentTransaction, RecurrenceDefinition, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a monthly subscription due on the 5th
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid date")?;
    let subscription = Obligation::subscription(
        "streaming",
        Money::from_str_exact("15.99")?,
        RecurrenceDefinition::monthly(start).on_day(5),
        "USD",
    );

    // partition the timeline into cycles
    let cycles = generate_cycles(&subscription.cycle_options()?)?;

    // reconcile the payments we know about
    let payments = vec![
        PaymentTransaction::new(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(), subscription.payment_amount),
        PaymentTransaction::new(Utc.with_ymd_and_hms(2024, 2, 7, 10, 0, 0).unwrap(), subscription.payment_amount),
    ];
    let time = SafeTimeProvider::new(TimeSource::System);
    let matched = match_transactions_to_cycles(&cycles, &payments, &MatchOptions::default(), &time);

    // print current state
    println!("{}", ObligationView::from_cycles(&subscription, &matched, &time).to_json_pretty()?);

    Ok(())
}
