/// shared lender - request threads and an expiry scheduler on one lender
use std::sync::Arc;
use std::thread;

use loan_qualification_rs::{Lender, LoanApplication, LoanStatus, Money};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .compact()
        .try_init();

    let lender = Arc::new(Lender::new(Money::from_minor(600_000))?);

    let workers: Vec<_> = (0..4)
        .map(|n| {
            let lender = Arc::clone(&lender);
            thread::spawn(move || -> Result<(), loan_qualification_rs::LenderError> {
                let requested = Money::from_minor(100_000 + n * 25_000);
                let loan = lender.qualify_loan(LoanApplication::new(
                    requested,
                    20,
                    720,
                    Money::from_minor(60_000),
                )?)?;
                lender.process(loan.id())?;
                Ok(())
            })
        })
        .collect();

    let sweeper = {
        let lender = Arc::clone(&lender);
        thread::spawn(move || lender.check_expired().map(|ids| ids.len()))
    };

    for worker in workers {
        if let Ok(Err(e)) = worker.join() {
            eprintln!("worker failed: {}", e);
        }
    }
    let _ = sweeper.join();

    println!("approved: {}", lender.find(LoanStatus::Approved)?.len());
    println!("on hold:  {}", lender.find(LoanStatus::OnHold)?.len());
    println!("balanced: {}", lender.fund_pool()?.is_balanced());

    Ok(())
}
