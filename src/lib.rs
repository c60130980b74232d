pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod funds;
pub mod lender;
pub mod loan;
pub mod qualification;
pub mod serialization;
pub mod types;

// re-export key types
pub use config::{ExpiryPolicy, LenderConfig, OnHoldPolicy, QualificationPolicy};
pub use decimal::{Money, Rate};
pub use errors::{LenderError, Result};
pub use events::{Event, EventStore};
pub use funds::FundPool;
pub use lender::{Lender, LenderBuilder};
pub use loan::{Loan, LoanApplication, LoanApplicationBuilder};
pub use qualification::{DecisionReason, QualificationEngine, QualificationOutcome};
pub use types::{LoanId, LoanStatus, Qualification};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
