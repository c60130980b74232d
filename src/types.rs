use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// outcome of the eligibility rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Qualification {
    FullyQualified,
    PartiallyQualified,
    NotQualified,
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// passed the eligibility rule, waiting to be processed
    Qualified,
    /// failed the eligibility rule
    Denied,
    /// funds reserved, waiting for the applicant
    Approved,
    /// not enough available fund when processed
    OnHold,
    /// applicant took the loan, funds disbursed
    Accepted,
    /// applicant declined, funds returned
    Rejected,
    /// applicant never answered in time, funds returned
    Expired,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 7] = [
        LoanStatus::Qualified,
        LoanStatus::Denied,
        LoanStatus::Approved,
        LoanStatus::OnHold,
        LoanStatus::Accepted,
        LoanStatus::Rejected,
        LoanStatus::Expired,
    ];

    /// the one status a loan must hold to move into `self`
    ///
    /// None for DENIED, which is only ever set by qualification.
    pub fn previous(&self) -> Option<LoanStatus> {
        match self {
            LoanStatus::Qualified => Some(LoanStatus::OnHold),
            LoanStatus::Approved | LoanStatus::OnHold => Some(LoanStatus::Qualified),
            LoanStatus::Accepted | LoanStatus::Rejected | LoanStatus::Expired => {
                Some(LoanStatus::Approved)
            }
            LoanStatus::Denied => None,
        }
    }

    /// check if the lifecycle allows moving to `next`
    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        next.previous() == Some(*self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Qualified => "QUALIFIED",
            LoanStatus::Denied => "DENIED",
            LoanStatus::Approved => "APPROVED",
            LoanStatus::OnHold => "ON_HOLD",
            LoanStatus::Accepted => "ACCEPTED",
            LoanStatus::Rejected => "REJECTED",
            LoanStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Qualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Qualification::FullyQualified => "FULLY_QUALIFIED",
            Qualification::PartiallyQualified => "PARTIALLY_QUALIFIED",
            Qualification::NotQualified => "NOT_QUALIFIED",
        };
        f.write_str(s)
    }
}
