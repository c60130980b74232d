use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LenderError, Result};

/// the lender's capital, split by where each unit currently sits
///
/// Every unit ever added is in exactly one of `available`, `pending` or
/// `disbursed`, so `available + pending + disbursed == total_added` holds
/// after every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FundPool {
    available: Money,
    pending: Money,
    disbursed: Money,
    total_added: Money,
}

impl FundPool {
    /// create a pool seeded with an initial fund
    pub fn new(initial: Money) -> Result<Self> {
        let mut pool = Self::default();
        pool.add(initial)?;
        Ok(pool)
    }

    pub fn available(&self) -> Money {
        self.available
    }

    pub fn pending(&self) -> Money {
        self.pending
    }

    /// capital that left the pool through accepted loans
    pub fn disbursed(&self) -> Money {
        self.disbursed
    }

    pub fn total_added(&self) -> Money {
        self.total_added
    }

    /// add capital to the available fund
    pub fn add(&mut self, amount: Money) -> Result<Money> {
        if amount.is_negative() {
            return Err(LenderError::InvalidAmount {
                amount,
                reason: "fund amount cannot be negative".to_string(),
            });
        }

        let available = checked_add(self.available, amount)?;
        let total_added = checked_add(self.total_added, amount)?;

        self.available = available;
        self.total_added = total_added;
        Ok(self.available)
    }

    /// check if `amount` can be reserved right now
    pub fn can_reserve(&self, amount: Money) -> bool {
        amount <= self.available
    }

    /// move an amount from available to pending
    pub fn reserve(&mut self, amount: Money) -> Result<()> {
        if amount.is_negative() {
            return Err(LenderError::InvalidAmount {
                amount,
                reason: "reserved amount cannot be negative".to_string(),
            });
        }

        if !self.can_reserve(amount) {
            return Err(LenderError::InsufficientFunds {
                available: self.available,
                requested: amount,
            });
        }

        let pending = checked_add(self.pending, amount)?;
        self.available = self.available - amount;
        self.pending = pending;
        Ok(())
    }

    /// move a reserved amount back from pending to available
    pub fn release(&mut self, amount: Money) -> Result<()> {
        self.ensure_pending(amount)?;

        let available = checked_add(self.available, amount)?;
        self.pending = self.pending - amount;
        self.available = available;
        Ok(())
    }

    /// a reserved amount leaves the pool for good
    pub fn disburse(&mut self, amount: Money) -> Result<()> {
        self.ensure_pending(amount)?;

        let disbursed = checked_add(self.disbursed, amount)?;
        self.pending = self.pending - amount;
        self.disbursed = disbursed;
        Ok(())
    }

    /// check the accounting identity
    pub fn is_balanced(&self) -> bool {
        let accounted = self
            .available
            .checked_add(self.pending)
            .and_then(|sum| sum.checked_add(self.disbursed));

        accounted == Some(self.total_added)
            && !self.available.is_negative()
            && !self.pending.is_negative()
    }

    fn ensure_pending(&self, amount: Money) -> Result<()> {
        if amount.is_negative() || amount > self.pending {
            return Err(LenderError::InsufficientPending {
                pending: self.pending,
                requested: amount,
            });
        }
        Ok(())
    }
}

fn checked_add(current: Money, amount: Money) -> Result<Money> {
    current
        .checked_add(amount)
        .ok_or(LenderError::FundOverflow { current, requested: amount })
}
