use serde::{Deserialize, Serialize};

use crate::config::QualificationPolicy;
use crate::decimal::Money;
use crate::errors::{LenderError, Result};
use crate::loan::LoanApplication;
use crate::types::{LoanStatus, Qualification};

/// result of running the eligibility rule on one application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationOutcome {
    pub qualification: Qualification,
    pub loan_amount: Money,
    pub status: LoanStatus,
    pub reason: DecisionReason,
}

/// which branch of the rule decided the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionReason {
    DebtToIncomeTooHigh,
    CreditScoreTooLow,
    InsufficientSavings,
    MeetsAllCriteria,
}

/// engine evaluating applications against a qualification policy
pub struct QualificationEngine {
    pub policy: QualificationPolicy,
}

impl QualificationEngine {
    pub fn new(policy: QualificationPolicy) -> Self {
        Self { policy }
    }

    /// evaluate the rule; first matching branch wins
    pub fn evaluate(&self, application: &LoanApplication) -> Result<QualificationOutcome> {
        if let Some(reason) = self.denial_reason(application) {
            return Ok(QualificationOutcome {
                qualification: Qualification::NotQualified,
                loan_amount: Money::ZERO,
                status: LoanStatus::Denied,
                reason,
            });
        }

        let savings = application.savings();
        let required = self.policy.min_savings_ratio.of(application.requested_amount());

        if savings.as_decimal() < required {
            let loan_amount = savings
                .checked_mul(self.policy.savings_multiplier)
                .ok_or(LenderError::InvalidAmount {
                    amount: savings,
                    reason: format!("savings x {} overflows", self.policy.savings_multiplier),
                })?;

            return Ok(QualificationOutcome {
                qualification: Qualification::PartiallyQualified,
                loan_amount,
                status: LoanStatus::Qualified,
                reason: DecisionReason::InsufficientSavings,
            });
        }

        Ok(QualificationOutcome {
            qualification: Qualification::FullyQualified,
            loan_amount: application.requested_amount(),
            status: LoanStatus::Qualified,
            reason: DecisionReason::MeetsAllCriteria,
        })
    }

    fn denial_reason(&self, application: &LoanApplication) -> Option<DecisionReason> {
        if application.dti() >= self.policy.max_dti {
            Some(DecisionReason::DebtToIncomeTooHigh)
        } else if application.credit_score() <= self.policy.min_credit_score {
            Some(DecisionReason::CreditScoreTooLow)
        } else {
            None
        }
    }
}

impl Default for QualificationEngine {
    fn default() -> Self {
        Self::new(QualificationPolicy::default())
    }
}
