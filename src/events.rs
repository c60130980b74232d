use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::qualification::DecisionReason;
use crate::types::{LoanId, LoanStatus, Qualification};

/// all events that can be emitted by the lender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // fund events
    FundAdded {
        amount: Money,
        available_fund: Money,
        timestamp: DateTime<Utc>,
    },

    // qualification events
    LoanQualified {
        loan_id: LoanId,
        qualification: Qualification,
        requested_amount: Money,
        loan_amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanDenied {
        loan_id: LoanId,
        reason: DecisionReason,
        timestamp: DateTime<Utc>,
    },

    // processing events
    LoanApproved {
        loan_id: LoanId,
        loan_amount: Money,
        approved_date: NaiveDate,
        available_fund: Money,
        pending_fund: Money,
        timestamp: DateTime<Utc>,
    },
    LoanOnHold {
        loan_id: LoanId,
        loan_amount: Money,
        available_fund: Money,
        timestamp: DateTime<Utc>,
    },
    LoanRequeued {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // applicant decision events
    LoanAccepted {
        loan_id: LoanId,
        disbursed_amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanRejected {
        loan_id: LoanId,
        returned_amount: Money,
        timestamp: DateTime<Utc>,
    },

    // expiry events
    LoanExpired {
        loan_id: LoanId,
        approved_date: NaiveDate,
        returned_amount: Money,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// status the loan entered, None for pool-level events
    pub fn resulting_status(&self) -> Option<LoanStatus> {
        match self {
            Event::FundAdded { .. } => None,
            Event::LoanQualified { .. } | Event::LoanRequeued { .. } => Some(LoanStatus::Qualified),
            Event::LoanDenied { .. } => Some(LoanStatus::Denied),
            Event::LoanApproved { .. } => Some(LoanStatus::Approved),
            Event::LoanOnHold { .. } => Some(LoanStatus::OnHold),
            Event::LoanAccepted { .. } => Some(LoanStatus::Accepted),
            Event::LoanRejected { .. } => Some(LoanStatus::Rejected),
            Event::LoanExpired { .. } => Some(LoanStatus::Expired),
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
