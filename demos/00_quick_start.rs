/// quick start - qualify, approve and accept one loan
use loan_qualification_rs::{Lender, LoanApplication, Money};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // lender with 350,000 of capital on system time
    let lender = Lender::new(Money::from_minor(350_000))?;

    let application = LoanApplication::new(
        Money::from_minor(250_000), // requested
        21,                         // dti %
        700,                        // credit score
        Money::from_minor(100_000), // savings
    )?;

    let loan = lender.qualify_loan(application)?;
    println!("qualification: {}", loan.qualification());

    lender.process(loan.id())?;
    lender.applicant_reply(loan.id(), true)?;

    println!("{}", lender.json());

    Ok(())
}
