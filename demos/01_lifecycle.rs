/// lifecycle - every branch of the state machine, with structured logs
use loan_qualification_rs::{Lender, LenderError, LoanApplication, LoanStatus, Money};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    println!("=== loan lifecycle ===\n");

    let lender = Lender::new(Money::from_minor(100_000))?;

    let full = lender.qualify_loan(LoanApplication::new(
        Money::from_minor(250_000), 21, 700, Money::from_minor(100_000),
    )?)?;
    let partial = lender.qualify_loan(LoanApplication::new(
        Money::from_minor(250_000), 30, 700, Money::from_minor(50_000),
    )?)?;
    let denied = lender.qualify_loan(LoanApplication::new(
        Money::from_minor(250_000), 37, 700, Money::from_minor(100_000),
    )?)?;

    println!("full:    {} -> lend {}", full.qualification(), full.loan_amount());
    println!("partial: {} -> lend {}", partial.qualification(), partial.loan_amount());
    println!("denied:  {} -> {}", denied.qualification(), denied.status());

    // not enough capital yet
    let held = lender.process(full.id())?;
    println!("\nprocessed with {} available: {}", lender.available_fund()?, held.status());

    // processing a denied loan is refused
    match lender.process(denied.id()) {
        Err(LenderError::InvalidState { .. }) => println!("denied loan refused: ok"),
        other => println!("unexpected: {:?}", other.map(|l| l.status())),
    }

    // top up, requeue and process again
    lender.add_fund(Money::from_minor(400_000))?;
    lender.retry(full.id())?;
    lender.process(full.id())?;
    lender.process(partial.id())?;
    println!(
        "\nafter top-up: available {}, pending {}",
        lender.available_fund()?,
        lender.pending_fund()?
    );

    lender.applicant_reply(full.id(), true)?;
    lender.applicant_reply(partial.id(), false)?;
    println!(
        "after replies: available {}, pending {}, disbursed {}",
        lender.available_fund()?,
        lender.pending_fund()?,
        lender.disbursed_fund()?
    );

    for status in LoanStatus::ALL {
        let count = lender.find(status)?.len();
        if count > 0 {
            println!("  {:<10} {}", status, count);
        }
    }

    println!("\nevents:");
    for event in lender.take_events()? {
        println!("  {:?}", event);
    }

    Ok(())
}
