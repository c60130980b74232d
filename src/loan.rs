use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LenderError, Result};
use crate::types::{LoanId, LoanStatus, Qualification};

/// applicant inputs, fixed once built
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanApplication {
    id: LoanId,
    requested_amount: Money,
    dti: u32,
    credit_score: u32,
    savings: Money,
}

impl LoanApplication {
    /// create an application with a fresh random id
    pub fn new(
        requested_amount: Money,
        dti: u32,
        credit_score: u32,
        savings: Money,
    ) -> Result<Self> {
        Self::with_id(Uuid::new_v4(), requested_amount, dti, credit_score, savings)
    }

    /// create an application under a caller-chosen id
    pub fn with_id(
        id: LoanId,
        requested_amount: Money,
        dti: u32,
        credit_score: u32,
        savings: Money,
    ) -> Result<Self> {
        if !requested_amount.is_positive() {
            return Err(LenderError::InvalidAmount {
                amount: requested_amount,
                reason: "requested amount must be positive".to_string(),
            });
        }

        if savings.is_negative() {
            return Err(LenderError::InvalidAmount {
                amount: savings,
                reason: "savings cannot be negative".to_string(),
            });
        }

        Ok(Self {
            id,
            requested_amount,
            dti,
            credit_score,
            savings,
        })
    }

    pub fn builder() -> LoanApplicationBuilder {
        LoanApplicationBuilder::new()
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn requested_amount(&self) -> Money {
        self.requested_amount
    }

    /// debt-to-income ratio as an integer percentage
    pub fn dti(&self) -> u32 {
        self.dti
    }

    pub fn credit_score(&self) -> u32 {
        self.credit_score
    }

    pub fn savings(&self) -> Money {
        self.savings
    }
}

/// builder for loan applications
#[derive(Debug, Default)]
pub struct LoanApplicationBuilder {
    id: Option<LoanId>,
    requested_amount: Option<Money>,
    dti: Option<u32>,
    credit_score: Option<u32>,
    savings: Option<Money>,
}

impl LoanApplicationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: LoanId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn requested_amount(mut self, amount: Money) -> Self {
        self.requested_amount = Some(amount);
        self
    }

    pub fn dti(mut self, dti: u32) -> Self {
        self.dti = Some(dti);
        self
    }

    pub fn credit_score(mut self, score: u32) -> Self {
        self.credit_score = Some(score);
        self
    }

    pub fn savings(mut self, savings: Money) -> Self {
        self.savings = Some(savings);
        self
    }

    pub fn build(self) -> Result<LoanApplication> {
        let requested_amount = self.requested_amount.ok_or(LenderError::InvalidConfiguration {
            message: "Requested amount required".to_string(),
        })?;

        let dti = self.dti.ok_or(LenderError::InvalidConfiguration {
            message: "Debt-to-income ratio required".to_string(),
        })?;

        let credit_score = self.credit_score.ok_or(LenderError::InvalidConfiguration {
            message: "Credit score required".to_string(),
        })?;

        let savings = self.savings.unwrap_or(Money::ZERO);

        LoanApplication::with_id(
            self.id.unwrap_or_else(Uuid::new_v4),
            requested_amount,
            dti,
            credit_score,
            savings,
        )
    }
}

/// a loan registered with a lender: the application plus the lender's decision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loan {
    application: LoanApplication,
    qualification: Qualification,
    loan_amount: Money,
    status: LoanStatus,
    approved_date: Option<NaiveDate>,
    qualified_at: DateTime<Utc>,
    status_changed_at: DateTime<Utc>,
}

impl Loan {
    /// record the qualification decision; tier and amount are fixed from here on
    pub(crate) fn decide(
        application: LoanApplication,
        qualification: Qualification,
        loan_amount: Money,
        status: LoanStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            application,
            qualification,
            loan_amount,
            status,
            approved_date: None,
            qualified_at: timestamp,
            status_changed_at: timestamp,
        }
    }

    pub fn id(&self) -> LoanId {
        self.application.id
    }

    pub fn application(&self) -> &LoanApplication {
        &self.application
    }

    pub fn requested_amount(&self) -> Money {
        self.application.requested_amount
    }

    pub fn dti(&self) -> u32 {
        self.application.dti
    }

    pub fn credit_score(&self) -> u32 {
        self.application.credit_score
    }

    pub fn savings(&self) -> Money {
        self.application.savings
    }

    pub fn qualification(&self) -> Qualification {
        self.qualification
    }

    /// amount the lender is willing to lend
    pub fn loan_amount(&self) -> Money {
        self.loan_amount
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn approved_date(&self) -> Option<NaiveDate> {
        self.approved_date
    }

    pub fn qualified_at(&self) -> DateTime<Utc> {
        self.qualified_at
    }

    pub fn status_changed_at(&self) -> DateTime<Utc> {
        self.status_changed_at
    }

    /// refuse a move the lifecycle does not allow, leaving the loan untouched
    pub(crate) fn ensure_transition(&self, next: LoanStatus) -> Result<()> {
        if self.status.can_transition_to(next) {
            return Ok(());
        }

        Err(LenderError::InvalidState {
            id: self.id(),
            current: self.status,
            // denied is never a transition target, report the entry status
            expected: next.previous().unwrap_or(LoanStatus::Qualified),
        })
    }

    /// update status
    pub(crate) fn update_status(
        &mut self,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_transition(new_status)?;
        self.status = new_status;
        self.status_changed_at = timestamp;
        Ok(())
    }

    /// mark approved and stamp the approval day
    pub(crate) fn approve(&mut self, timestamp: DateTime<Utc>) -> Result<()> {
        self.update_status(LoanStatus::Approved, timestamp)?;
        self.approved_date = Some(timestamp.date_naive());
        Ok(())
    }

    /// whole days elapsed since approval, None if never approved
    pub fn days_since_approval(&self, today: NaiveDate) -> Option<i64> {
        self.approved_date.map(|approved| (today - approved).num_days())
    }
}
