use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LenderError, Result};

/// lender configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LenderConfig {
    #[serde(default)]
    pub qualification: QualificationPolicy,
    #[serde(default)]
    pub expiry: ExpiryPolicy,
    #[serde(default)]
    pub on_hold: OnHoldPolicy,
}

/// thresholds of the eligibility rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationPolicy {
    /// a debt-to-income percentage at or above this is denied
    pub max_dti: u32,
    /// a credit score at or below this is denied
    pub min_credit_score: u32,
    /// savings below this share of the requested amount only partially qualify
    pub min_savings_ratio: Rate,
    /// a partial qualification lends savings times this factor
    pub savings_multiplier: u32,
}

impl Default for QualificationPolicy {
    fn default() -> Self {
        Self {
            max_dti: 36,
            min_credit_score: 620,
            min_savings_ratio: Rate::from_decimal(dec!(0.25)),
            savings_multiplier: 4,
        }
    }
}

/// how long an approval waits for the applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryPolicy {
    /// approvals older than this many days expire on the next sweep
    pub approval_valid_days: u32,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self { approval_valid_days: 3 }
    }
}

/// what `process` does with a loan parked on hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OnHoldPolicy {
    /// on-hold loans must be moved back to qualified with `retry` first
    #[default]
    RequireRetry,
    /// `process` accepts on-hold loans directly
    Reprocess,
}

impl LenderConfig {
    /// standard underwriting: dti < 36, score > 620, savings >= 25%, 3 day approvals
    pub fn standard() -> Self {
        Self::default()
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LenderConfig =
            serde_json::from_str(json).map_err(|e| LenderError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_on_hold(mut self, policy: OnHoldPolicy) -> Self {
        self.on_hold = policy;
        self
    }

    /// check the policy is internally consistent
    pub fn validate(&self) -> Result<()> {
        let ratio = self.qualification.min_savings_ratio;
        if ratio <= Rate::ZERO || ratio > Rate::ONE {
            return Err(LenderError::InvalidConfiguration {
                message: format!("min_savings_ratio must be in (0, 1], got {}", ratio.as_decimal()),
            });
        }

        if self.qualification.savings_multiplier == 0 {
            return Err(LenderError::InvalidConfiguration {
                message: "savings_multiplier must be positive".to_string(),
            });
        }

        if self.qualification.max_dti == 0 {
            return Err(LenderError::InvalidConfiguration {
                message: "max_dti must be positive".to_string(),
            });
        }

        Ok(())
    }
}
