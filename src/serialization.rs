/// serialization support for the lender
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{LenderConfig, OnHoldPolicy};
use crate::decimal::{Money, Rate};
use crate::funds::FundPool;
use crate::loan::Loan;
use crate::types::{LoanId, LoanStatus, Qualification};

/// serializable view of a lender's state
#[derive(Debug, Serialize, Deserialize)]
pub struct LenderView {
    pub funds: FundView,
    pub policy: PolicyView,
    pub status_counts: BTreeMap<String, usize>,
    pub loans: Vec<LoanView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FundView {
    pub available_fund: Money,
    pub pending_fund: Money,
    pub disbursed_fund: Money,
    pub total_added: Money,
    pub balanced: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyView {
    pub max_dti: u32,
    pub min_credit_score: u32,
    pub min_savings_ratio: Rate,
    pub savings_multiplier: u32,
    pub approval_valid_days: u32,
    pub on_hold: OnHoldPolicy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub requested_amount: Money,
    pub dti: u32,
    pub credit_score: u32,
    pub savings: Money,
    pub qualification: Qualification,
    pub loan_amount: Money,
    pub status: LoanStatus,
    pub approved_date: Option<NaiveDate>,
    pub qualified_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        LoanView {
            id: loan.id(),
            requested_amount: loan.requested_amount(),
            dti: loan.dti(),
            credit_score: loan.credit_score(),
            savings: loan.savings(),
            qualification: loan.qualification(),
            loan_amount: loan.loan_amount(),
            status: loan.status(),
            approved_date: loan.approved_date(),
            qualified_at: loan.qualified_at(),
            status_changed_at: loan.status_changed_at(),
        }
    }
}

impl LenderView {
    pub fn from_parts<'a>(
        funds: &FundPool,
        loans: impl Iterator<Item = &'a Loan>,
        config: &LenderConfig,
    ) -> Self {
        let mut loans: Vec<LoanView> = loans.map(LoanView::from_loan).collect();
        // oldest first, id as tie-breaker so output is stable
        loans.sort_by(|a, b| a.qualified_at.cmp(&b.qualified_at).then(a.id.cmp(&b.id)));

        let mut status_counts = BTreeMap::new();
        for loan in &loans {
            *status_counts.entry(loan.status.to_string()).or_insert(0) += 1;
        }

        LenderView {
            funds: FundView {
                available_fund: funds.available(),
                pending_fund: funds.pending(),
                disbursed_fund: funds.disbursed(),
                total_added: funds.total_added(),
                balanced: funds.is_balanced(),
            },
            policy: PolicyView {
                max_dti: config.qualification.max_dti,
                min_credit_score: config.qualification.min_credit_score,
                min_savings_ratio: config.qualification.min_savings_ratio,
                savings_multiplier: config.qualification.savings_multiplier,
                approval_valid_days: config.expiry.approval_valid_days,
                on_hold: config.on_hold,
            },
            status_counts,
            loans,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
