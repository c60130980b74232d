use thiserror::Error;

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LenderError {
    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("{}", describe_state(.expected))]
    InvalidState {
        id: LoanId,
        current: LoanStatus,
        expected: LoanStatus,
    },

    #[error("loan already registered: {id}")]
    DuplicateLoan {
        id: LoanId,
    },

    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount {
        amount: Money,
        reason: String,
    },

    #[error("fund overflow: {current} + {requested}")]
    FundOverflow {
        current: Money,
        requested: Money,
    },

    #[error("insufficient pending fund: pending {pending}, requested {requested}")]
    InsufficientPending {
        pending: Money,
        requested: Money,
    },

    #[error("insufficient available fund: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Money,
        requested: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("lender state lock poisoned")]
    LockPoisoned,
}

fn describe_state(expected: &LoanStatus) -> String {
    match expected {
        LoanStatus::Qualified => "loan is not in QUALIFIED status".to_string(),
        other => format!("loan is not {}", other),
    }
}

pub type Result<T> = std::result::Result<T, LenderError>;
