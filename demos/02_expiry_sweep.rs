/// expiry sweep - deterministic expiry with a controlled clock
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use loan_qualification_rs::{Lender, LoanApplication, Money, SafeTimeProvider, TimeSource};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init();

    println!("=== expiry sweep ===\n");

    let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    )));
    let controller = time.test_control().unwrap();

    let lender = Lender::builder()
        .initial_fund(Money::from_minor(1_000_000))
        .time(Arc::clone(&time))
        .build()?;

    let first = lender.qualify_loan(LoanApplication::new(
        Money::from_minor(250_000), 21, 700, Money::from_minor(100_000),
    )?)?;
    lender.process(first.id())?;
    println!("approved first loan on {}", time.now().format("%Y-%m-%d"));

    // one sweep per simulated day
    for day in 1..=5 {
        controller.advance(Duration::days(1));

        if day == 2 {
            let second = lender.qualify_loan(LoanApplication::new(
                Money::from_minor(200_000), 15, 750, Money::from_minor(80_000),
            )?)?;
            lender.process(second.id())?;
            println!("approved second loan on {}", time.now().format("%Y-%m-%d"));
        }

        let expired = lender.check_expired()?;
        println!(
            "{}: expired {}, available {}, pending {}",
            time.now().format("%Y-%m-%d"),
            expired.len(),
            lender.available_fund()?,
            lender.pending_fund()?
        );
    }

    Ok(())
}
