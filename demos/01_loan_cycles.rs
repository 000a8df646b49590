/// loan cycles - amortized obligation, schedule and implied rate
use recurring_obligations_rs::chrono::NaiveDate;
use recurring_obligations_rs::{
    generate_cycles, AmortizationCalculator, Frequency, LoanTerm, Money, Obligation, Rate,
    RecurrenceDefinition,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== loan cycles example ===\n");

    let principal = Money::from_major(12_000);
    let rate = Rate::from_percentage(12);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid date")?;
    let calculator = AmortizationCalculator::new();

    // level payment for a one-year term
    let payment = calculator.monthly_payment(principal, rate, 12);
    println!("monthly payment: ${}", payment);

    // paying less stretches the term
    match calculator.loan_term_months(principal, rate, Money::from_major(1_000)) {
        LoanTerm::Months(months) => println!("term at $1000/month: {} months", months),
        LoanTerm::Never => println!("$1000/month never repays the loan"),
    }

    // recover the rate from the payment
    let solution = calculator.interest_rate_from_terms(principal, payment, 12);
    println!(
        "implied rate: {}% after {} iterations ({:?})",
        solution.annual_rate_percent, solution.iterations, solution.termination
    );

    // cycles carry the expected principal/interest split
    let loan = Obligation::loan("car", principal, rate, payment, RecurrenceDefinition::monthly(start), "USD");
    let cycles = generate_cycles(&loan.cycle_options()?)?;
    println!("\n{:>3}  {:<10}  {:>10}  {:>10}  {:>10}", "#", "due", "principal", "interest", "balance");
    for cycle in &cycles {
        println!(
            "{:>3}  {:<10}  {:>10}  {:>10}  {:>10}",
            cycle.cycle_number,
            cycle.expected_date.to_string(),
            cycle.expected_principal.unwrap_or(Money::ZERO).to_string(),
            cycle.expected_interest.unwrap_or(Money::ZERO).to_string(),
            cycle.remaining_balance.unwrap_or(Money::ZERO).to_string(),
        );
    }

    // the schedule clamps the final payment to what is left
    let schedule = calculator.generate_schedule(principal, rate, payment, start, Frequency::monthly(), true);
    println!("\ntotal interest: ${}", schedule.total_interest);
    println!("total paid: ${}", schedule.total_paid);
    if let Some(payoff) = schedule.payoff_date() {
        println!("paid off on: {}", payoff);
    }

    Ok(())
}
