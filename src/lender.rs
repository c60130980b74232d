use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::{debug, info, warn};

use crate::config::{LenderConfig, OnHoldPolicy};
use crate::decimal::Money;
use crate::errors::{LenderError, Result};
use crate::events::{Event, EventStore};
use crate::funds::FundPool;
use crate::loan::{Loan, LoanApplication};
use crate::qualification::QualificationEngine;
use crate::types::{LoanId, LoanStatus};

/// everything the lender mutates, guarded by one lock
#[derive(Debug, Default)]
struct LoanBook {
    funds: FundPool,
    loans: HashMap<LoanId, Loan>,
    events: EventStore,
}

impl LoanBook {
    fn loan_mut(&mut self, id: LoanId) -> Result<&mut Loan> {
        self.loans.get_mut(&id).ok_or(LenderError::LoanNotFound { id })
    }
}

/// core lender: a fund pool plus every loan it has qualified
///
/// All operations take `&self` and serialize on a single internal mutex, so a
/// lender can be shared as `Arc<Lender>` between a request path and a
/// scheduler running [`Lender::check_expired`]. Preconditions are checked
/// before anything is mutated.
pub struct Lender {
    config: LenderConfig,
    engine: QualificationEngine,
    time: Arc<SafeTimeProvider>,
    book: Mutex<LoanBook>,
}

impl Lender {
    /// create a lender with the standard policy on system time
    pub fn new(initial_fund: Money) -> Result<Self> {
        LenderBuilder::new().initial_fund(initial_fund).build()
    }

    /// builder for creating lenders
    pub fn builder() -> LenderBuilder {
        LenderBuilder::new()
    }

    pub fn config(&self) -> &LenderConfig {
        &self.config
    }

    /// the clock this lender reads "now" from
    pub fn time(&self) -> &SafeTimeProvider {
        &self.time
    }

    fn book(&self) -> Result<MutexGuard<'_, LoanBook>> {
        self.book.lock().map_err(|_| LenderError::LockPoisoned)
    }

    fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    /// add capital to the available fund
    pub fn add_fund(&self, amount: Money) -> Result<Money> {
        let now = self.now();
        let mut book = self.book()?;

        let available_fund = book.funds.add(amount)?;
        book.events.emit(Event::FundAdded {
            amount,
            available_fund,
            timestamp: now,
        });

        info!(%amount, %available_fund, "fund added");
        Ok(available_fund)
    }

    /// run the eligibility rule and register the loan, denied or not
    pub fn qualify_loan(&self, application: LoanApplication) -> Result<Loan> {
        let now = self.now();
        let outcome = self.engine.evaluate(&application)?;
        let mut book = self.book()?;

        let id = application.id();
        if book.loans.contains_key(&id) {
            return Err(LenderError::DuplicateLoan { id });
        }

        let requested_amount = application.requested_amount();
        let loan = Loan::decide(
            application,
            outcome.qualification,
            outcome.loan_amount,
            outcome.status,
            now,
        );

        if outcome.status == LoanStatus::Denied {
            book.events.emit(Event::LoanDenied {
                loan_id: id,
                reason: outcome.reason,
                timestamp: now,
            });
        } else {
            book.events.emit(Event::LoanQualified {
                loan_id: id,
                qualification: outcome.qualification,
                requested_amount,
                loan_amount: outcome.loan_amount,
                timestamp: now,
            });
        }

        debug!(
            loan_id = %id,
            qualification = %outcome.qualification,
            loan_amount = %outcome.loan_amount,
            reason = ?outcome.reason,
            "loan qualified"
        );

        book.loans.insert(id, loan.clone());
        Ok(loan)
    }

    /// reserve funds for a qualified loan, or park it on hold
    pub fn process(&self, id: LoanId) -> Result<Loan> {
        let now = self.now();
        let reprocess = self.config.on_hold == OnHoldPolicy::Reprocess;
        let mut guard = self.book()?;
        let book = &mut *guard;

        let loan = book.loans.get_mut(&id).ok_or(LenderError::LoanNotFound { id })?;
        // under the reprocess policy an on-hold loan is requeued in the same step
        let requeue = reprocess && loan.status() == LoanStatus::OnHold;
        if !requeue {
            loan.ensure_transition(LoanStatus::Approved)?;
        }

        let amount = loan.loan_amount();
        if book.funds.can_reserve(amount) {
            book.funds.reserve(amount)?;
            if requeue {
                loan.update_status(LoanStatus::Qualified, now)?;
            }
            loan.approve(now)?;

            book.events.emit(Event::LoanApproved {
                loan_id: id,
                loan_amount: amount,
                approved_date: now.date_naive(),
                available_fund: book.funds.available(),
                pending_fund: book.funds.pending(),
                timestamp: now,
            });
            info!(
                loan_id = %id,
                %amount,
                available_fund = %book.funds.available(),
                pending_fund = %book.funds.pending(),
                "loan approved"
            );
        } else {
            if !requeue {
                loan.update_status(LoanStatus::OnHold, now)?;
            }

            book.events.emit(Event::LoanOnHold {
                loan_id: id,
                loan_amount: amount,
                available_fund: book.funds.available(),
                timestamp: now,
            });
            warn!(
                loan_id = %id,
                %amount,
                available_fund = %book.funds.available(),
                "insufficient fund, loan on hold"
            );
        }

        Ok(loan.clone())
    }

    /// move an on-hold loan back to qualified so it can be processed again
    pub fn retry(&self, id: LoanId) -> Result<Loan> {
        let now = self.now();
        let mut book = self.book()?;

        let loan = book.loan_mut(id)?;
        loan.update_status(LoanStatus::Qualified, now)?;
        let loan = loan.clone();

        book.events.emit(Event::LoanRequeued {
            loan_id: id,
            timestamp: now,
        });
        info!(loan_id = %id, "on-hold loan requeued");

        Ok(loan)
    }

    /// record the applicant's answer to an approved loan
    pub fn applicant_reply(&self, id: LoanId, accept: bool) -> Result<Loan> {
        let now = self.now();
        let mut guard = self.book()?;
        let book = &mut *guard;

        let loan = book.loans.get_mut(&id).ok_or(LenderError::LoanNotFound { id })?;
        let next = if accept {
            LoanStatus::Accepted
        } else {
            LoanStatus::Rejected
        };
        loan.ensure_transition(next)?;

        let amount = loan.loan_amount();
        if accept {
            book.funds.disburse(amount)?;
            loan.update_status(next, now)?;

            book.events.emit(Event::LoanAccepted {
                loan_id: id,
                disbursed_amount: amount,
                timestamp: now,
            });
            info!(loan_id = %id, %amount, "loan accepted, funds disbursed");
        } else {
            book.funds.release(amount)?;
            loan.update_status(next, now)?;

            book.events.emit(Event::LoanRejected {
                loan_id: id,
                returned_amount: amount,
                timestamp: now,
            });
            info!(loan_id = %id, %amount, "loan rejected, funds returned");
        }

        Ok(loan.clone())
    }

    /// expire approvals the applicant left unanswered for too long
    ///
    /// Returns the ids expired by this sweep. Safe to call at any cadence:
    /// an expired loan is no longer approved, so its funds move only once.
    pub fn check_expired(&self) -> Result<Vec<LoanId>> {
        let now = self.now();
        let today = now.date_naive();
        let valid_days = i64::from(self.config.expiry.approval_valid_days);
        let mut guard = self.book()?;
        let book = &mut *guard;

        let due: Vec<(LoanId, Money, NaiveDate)> = book
            .loans
            .values()
            .filter(|loan| loan.status() == LoanStatus::Approved)
            .filter_map(|loan| {
                let approved_date = loan.approved_date()?;
                let age = loan.days_since_approval(today)?;
                (age > valid_days).then(|| (loan.id(), loan.loan_amount(), approved_date))
            })
            .collect();

        // release the whole sweep at once so a failure leaves every loan as it was
        let total = due.iter().try_fold(Money::ZERO, |total, (_, amount, _)| {
            total.checked_add(*amount).ok_or(LenderError::FundOverflow {
                current: total,
                requested: *amount,
            })
        })?;
        book.funds.release(total)?;

        let mut expired = Vec::with_capacity(due.len());
        for (id, amount, approved_date) in due {
            book.loan_mut(id)?.update_status(LoanStatus::Expired, now)?;

            book.events.emit(Event::LoanExpired {
                loan_id: id,
                approved_date,
                returned_amount: amount,
                timestamp: now,
            });
            info!(loan_id = %id, %amount, %approved_date, "approval expired, funds returned");

            expired.push(id);
        }

        debug!(expired = expired.len(), "expiry sweep finished");
        Ok(expired)
    }

    /// all loans currently in `status`
    pub fn find(&self, status: LoanStatus) -> Result<HashSet<Loan>> {
        let book = self.book()?;

        Ok(book
            .loans
            .values()
            .filter(|loan| loan.status() == status)
            .cloned()
            .collect())
    }

    /// look up one loan
    pub fn get(&self, id: LoanId) -> Result<Loan> {
        let book = self.book()?;
        book.loans.get(&id).cloned().ok_or(LenderError::LoanNotFound { id })
    }

    /// snapshot of every registered loan
    pub fn loans(&self) -> Result<HashMap<LoanId, Loan>> {
        Ok(self.book()?.loans.clone())
    }

    pub fn available_fund(&self) -> Result<Money> {
        Ok(self.book()?.funds.available())
    }

    pub fn pending_fund(&self) -> Result<Money> {
        Ok(self.book()?.funds.pending())
    }

    pub fn disbursed_fund(&self) -> Result<Money> {
        Ok(self.book()?.funds.disbursed())
    }

    /// snapshot of the fund counters
    pub fn fund_pool(&self) -> Result<FundPool> {
        Ok(self.book()?.funds.clone())
    }

    /// copy of the events emitted so far
    pub fn events(&self) -> Result<Vec<Event>> {
        Ok(self.book()?.events.events().to_vec())
    }

    /// drain the events emitted so far
    pub fn take_events(&self) -> Result<Vec<Event>> {
        Ok(self.book()?.events.take_events())
    }

    /// get json representation of current state
    pub fn to_json_pretty(&self) -> String {
        use crate::serialization::LenderView;

        let view = match self.book() {
            Ok(book) => LenderView::from_parts(&book.funds, book.loans.values(), &self.config),
            Err(e) => return format!("JSON error: {}", e),
        };

        view.to_json_pretty().unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    /// short alias for json output
    pub fn json(&self) -> String {
        self.to_json_pretty()
    }
}

/// builder for lenders
pub struct LenderBuilder {
    initial_fund: Money,
    config: Option<LenderConfig>,
    time: Option<Arc<SafeTimeProvider>>,
}

impl LenderBuilder {
    pub fn new() -> Self {
        Self {
            initial_fund: Money::ZERO,
            config: None,
            time: None,
        }
    }

    pub fn initial_fund(mut self, amount: Money) -> Self {
        self.initial_fund = amount;
        self
    }

    pub fn config(mut self, config: LenderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// share a time provider with the lender
    pub fn time(mut self, time: Arc<SafeTimeProvider>) -> Self {
        self.time = Some(time);
        self
    }

    /// build, defaulting to the standard policy and system time
    pub fn build(self) -> Result<Lender> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let funds = FundPool::new(self.initial_fund)?;
        let time = self
            .time
            .unwrap_or_else(|| Arc::new(SafeTimeProvider::new(TimeSource::System)));

        Ok(Lender {
            engine: QualificationEngine::new(config.qualification.clone()),
            config,
            time,
            book: Mutex::new(LoanBook {
                funds,
                ..LoanBook::default()
            }),
        })
    }
}

impl Default for LenderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Qualification;
    use chrono::{Duration, TimeZone};

    fn test_time() -> Arc<SafeTimeProvider> {
        Arc::new(SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        )))
    }

    fn lender(initial: i64, time: &Arc<SafeTimeProvider>) -> Lender {
        Lender::builder()
            .initial_fund(Money::from_minor(initial))
            .time(Arc::clone(time))
            .build()
            .unwrap()
    }

    fn application(requested: i64, dti: u32, score: u32, savings: i64) -> LoanApplication {
        let (requested, savings) = (Money::from_minor(requested), Money::from_minor(savings));
        LoanApplication::new(requested, dti, score, savings).unwrap()
    }

    fn fully_qualified() -> LoanApplication {
        application(250_000, 21, 700, 100_000)
    }

    fn high_dti() -> LoanApplication {
        application(250_000, 37, 700, 100_000)
    }

    fn low_credit_score() -> LoanApplication {
        application(250_000, 30, 600, 100_000)
    }

    fn partially_qualified() -> LoanApplication {
        application(250_000, 30, 700, 50_000)
    }

    #[test]
    fn test_initial_and_added_fund() {
        let time = test_time();
        let lender = lender(100_000, &time);

        assert_eq!(lender.available_fund().unwrap(), Money::from_minor(100_000));

        lender.add_fund(Money::from_minor(50_000)).unwrap();
        assert_eq!(lender.available_fund().unwrap(), Money::from_minor(150_000));
    }

    #[test]
    fn test_negative_fund_rejected() {
        let time = test_time();
        let lender = lender(100_000, &time);

        let err = lender.add_fund(Money::from_minor(-1)).unwrap_err();
        assert!(matches!(err, LenderError::InvalidAmount { .. }));
        assert_eq!(lender.available_fund().unwrap(), Money::from_minor(100_000));
    }

    #[test]
    fn test_qualify_registers_loan() {
        let time = test_time();
        let lender = lender(100_000, &time);

        let loan = lender.qualify_loan(fully_qualified()).unwrap();

        assert_eq!(loan.qualification(), Qualification::FullyQualified);
        assert_eq!(loan.loan_amount(), Money::from_minor(250_000));
        assert_eq!(loan.status(), LoanStatus::Qualified);
        assert_eq!(lender.get(loan.id()).unwrap(), loan);
    }

    #[test]
    fn test_denied_loans_are_kept() {
        let time = test_time();
        let lender = lender(100_000, &time);

        let loan = lender.qualify_loan(high_dti()).unwrap();

        assert_eq!(loan.qualification(), Qualification::NotQualified);
        assert_eq!(loan.loan_amount(), Money::ZERO);
        assert_eq!(loan.status(), LoanStatus::Denied);
        assert!(lender.loans().unwrap().contains_key(&loan.id()));
    }

    #[test]
    fn test_duplicate_registration_refused() {
        let time = test_time();
        let lender = lender(100_000, &time);
        let app = fully_qualified();

        lender.qualify_loan(app.clone()).unwrap();
        let err = lender.qualify_loan(app).unwrap_err();

        assert!(matches!(err, LenderError::DuplicateLoan { .. }));
        assert_eq!(lender.loans().unwrap().len(), 1);
    }

    #[test]
    fn test_process_approves_and_reserves() {
        let time = test_time();
        let lender = lender(100_000, &time);
        lender.add_fund(Money::from_minor(150_000)).unwrap();
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();

        let loan = lender.process(id).unwrap();

        assert_eq!(loan.status(), LoanStatus::Approved);
        assert_eq!(loan.approved_date(), Some(time.now().date_naive()));
        assert_eq!(lender.available_fund().unwrap(), Money::ZERO);
        assert_eq!(lender.pending_fund().unwrap(), Money::from_minor(250_000));
    }

    #[test]
    fn test_process_insufficient_fund_puts_on_hold() {
        let time = test_time();
        let lender = lender(100_000, &time);
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();

        let loan = lender.process(id).unwrap();

        assert_eq!(loan.status(), LoanStatus::OnHold);
        assert_eq!(loan.approved_date(), None);
        assert_eq!(lender.available_fund().unwrap(), Money::from_minor(100_000));
        assert_eq!(lender.pending_fund().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_process_denied_loan_fails() {
        let time = test_time();
        let lender = lender(100_000, &time);
        let id = lender.qualify_loan(high_dti()).unwrap().id();

        let err = lender.process(id).unwrap_err();

        assert_eq!(err.to_string(), "loan is not in QUALIFIED status");
        assert!(matches!(
            err,
            LenderError::InvalidState { current: LoanStatus::Denied, .. }
        ));
    }

    #[test]
    fn test_on_hold_requires_retry_by_default() {
        let time = test_time();
        let lender = lender(100_000, &time);
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(id).unwrap();

        assert!(matches!(
            lender.process(id),
            Err(LenderError::InvalidState { current: LoanStatus::OnHold, .. })
        ));

        lender.add_fund(Money::from_minor(150_000)).unwrap();
        assert_eq!(lender.retry(id).unwrap().status(), LoanStatus::Qualified);
        assert_eq!(lender.process(id).unwrap().status(), LoanStatus::Approved);
        assert_eq!(lender.available_fund().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_reprocess_policy_accepts_on_hold() {
        let time = test_time();
        let lender = Lender::builder()
            .initial_fund(Money::from_minor(100_000))
            .config(LenderConfig::standard().with_on_hold(OnHoldPolicy::Reprocess))
            .time(Arc::clone(&time))
            .build()
            .unwrap();
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();

        assert_eq!(lender.process(id).unwrap().status(), LoanStatus::OnHold);
        assert_eq!(lender.process(id).unwrap().status(), LoanStatus::OnHold);

        lender.add_fund(Money::from_minor(150_000)).unwrap();
        assert_eq!(lender.process(id).unwrap().status(), LoanStatus::Approved);
    }

    #[test]
    fn test_retry_requires_on_hold() {
        let time = test_time();
        let lender = lender(1_000_000, &time);
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();

        let err = lender.retry(id).unwrap_err();
        assert_eq!(err.to_string(), "loan is not ON_HOLD");
    }

    #[test]
    fn test_accept_disburses() {
        let time = test_time();
        let lender = lender(100_000, &time);
        lender.add_fund(Money::from_minor(150_000)).unwrap();
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(id).unwrap();

        let loan = lender.applicant_reply(id, true).unwrap();

        assert_eq!(loan.status(), LoanStatus::Accepted);
        assert_eq!(lender.available_fund().unwrap(), Money::ZERO);
        assert_eq!(lender.pending_fund().unwrap(), Money::ZERO);
        assert_eq!(lender.disbursed_fund().unwrap(), Money::from_minor(250_000));
    }

    #[test]
    fn test_reject_returns_funds() {
        let time = test_time();
        let lender = lender(100_000, &time);
        lender.add_fund(Money::from_minor(150_000)).unwrap();
        let id = lender.qualify_loan(partially_qualified()).unwrap().id();
        lender.process(id).unwrap();

        let loan = lender.applicant_reply(id, false).unwrap();

        assert_eq!(loan.status(), LoanStatus::Rejected);
        assert_eq!(lender.available_fund().unwrap(), Money::from_minor(250_000));
        assert_eq!(lender.pending_fund().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_reply_to_unapproved_loan_fails() {
        let time = test_time();
        let lender = lender(100_000, &time);
        let id = lender.qualify_loan(high_dti()).unwrap().id();

        let err = lender.applicant_reply(id, true).unwrap_err();

        assert_eq!(err.to_string(), "loan is not APPROVED");
        assert_eq!(lender.get(id).unwrap().status(), LoanStatus::Denied);
    }

    #[test]
    fn test_unknown_id_not_found() {
        let time = test_time();
        let lender = lender(100_000, &time);
        let id = uuid::Uuid::new_v4();

        assert_eq!(lender.process(id).unwrap_err(), LenderError::LoanNotFound { id });
        assert_eq!(lender.applicant_reply(id, true).unwrap_err(), LenderError::LoanNotFound { id });
        assert_eq!(lender.retry(id).unwrap_err(), LenderError::LoanNotFound { id });
        assert_eq!(lender.get(id).unwrap_err(), LenderError::LoanNotFound { id });
    }

    #[test]
    fn test_check_expired() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let lender = lender(1_000_000, &time);

        let stale = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(stale).unwrap();

        control.advance(Duration::days(4));

        let fresh = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(fresh).unwrap();

        let expired = lender.check_expired().unwrap();

        assert_eq!(expired, vec![stale]);
        assert_eq!(lender.get(stale).unwrap().status(), LoanStatus::Expired);
        assert_eq!(lender.get(fresh).unwrap().status(), LoanStatus::Approved);
        assert_eq!(lender.pending_fund().unwrap(), Money::from_minor(250_000));
        assert_eq!(lender.available_fund().unwrap(), Money::from_minor(750_000));
    }

    #[test]
    fn test_expiry_threshold_boundary() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let lender = lender(1_000_000, &time);
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(id).unwrap();

        control.advance(Duration::days(3));
        assert!(lender.check_expired().unwrap().is_empty());
        assert_eq!(lender.get(id).unwrap().status(), LoanStatus::Approved);

        control.advance(Duration::days(1));
        assert_eq!(lender.check_expired().unwrap(), vec![id]);

        // a second sweep must not move the funds again
        assert!(lender.check_expired().unwrap().is_empty());
        assert_eq!(lender.available_fund().unwrap(), Money::from_minor(1_000_000));
        assert_eq!(lender.pending_fund().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_expiry_ignores_other_statuses() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let lender = lender(300_000, &time);

        let accepted = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(accepted).unwrap();
        lender.applicant_reply(accepted, true).unwrap();
        let on_hold = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(on_hold).unwrap();

        control.advance(Duration::days(30));

        assert!(lender.check_expired().unwrap().is_empty());
        assert_eq!(lender.get(accepted).unwrap().status(), LoanStatus::Accepted);
        assert_eq!(lender.get(on_hold).unwrap().status(), LoanStatus::OnHold);
    }

    #[test]
    fn test_find_by_status() {
        let time = test_time();
        let lender = lender(100_000, &time);

        let full = lender.qualify_loan(fully_qualified()).unwrap();
        let dti = lender.qualify_loan(high_dti()).unwrap();
        let score = lender.qualify_loan(low_credit_score()).unwrap();
        let partial = lender.qualify_loan(partially_qualified()).unwrap();

        assert_eq!(
            lender.find(LoanStatus::Qualified).unwrap(),
            HashSet::from([full.clone(), partial])
        );
        assert_eq!(lender.find(LoanStatus::Denied).unwrap(), HashSet::from([dti, score]));

        let on_hold = lender.process(full.id()).unwrap();
        assert_eq!(lender.find(LoanStatus::OnHold).unwrap(), HashSet::from([on_hold]));
        assert!(lender.find(LoanStatus::Expired).unwrap().is_empty());
    }

    #[test]
    fn test_find_is_idempotent() {
        let time = test_time();
        let lender = lender(100_000, &time);
        lender.qualify_loan(fully_qualified()).unwrap();
        lender.qualify_loan(partially_qualified()).unwrap();

        let first = lender.find(LoanStatus::Qualified).unwrap();
        let second = lender.find(LoanStatus::Qualified).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_events_follow_lifecycle() {
        let time = test_time();
        let lender = lender(350_000, &time);
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(id).unwrap();
        lender.applicant_reply(id, true).unwrap();

        let statuses: Vec<_> = lender
            .take_events()
            .unwrap()
            .iter()
            .filter_map(Event::resulting_status)
            .collect();

        assert_eq!(
            statuses,
            vec![LoanStatus::Qualified, LoanStatus::Approved, LoanStatus::Accepted]
        );
        assert!(lender.events().unwrap().is_empty());
    }

    #[test]
    fn test_approval_event_carries_timestamp() {
        let time = test_time();
        let lender = lender(350_000, &time);
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.take_events().unwrap();

        lender.process(id).unwrap();

        match lender.take_events().unwrap().as_slice() {
            [Event::LoanApproved {
                loan_id,
                approved_date,
                timestamp,
                ..
            }] => {
                assert_eq!(*loan_id, id);
                assert_eq!(*timestamp, time.now());
                assert_eq!(*approved_date, timestamp.date_naive());
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_expiry_sweep_settles_every_due_loan() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let lender = lender(1_000_000, &time);
        let ids: Vec<_> = (0..3)
            .map(|_| {
                let id = lender.qualify_loan(fully_qualified()).unwrap().id();
                lender.process(id).unwrap();
                id
            })
            .collect();
        lender.take_events().unwrap();

        control.advance(Duration::days(4));
        let mut expired = lender.check_expired().unwrap();
        expired.sort();
        let mut expected = ids.clone();
        expected.sort();

        assert_eq!(expired, expected);
        assert_eq!(lender.pending_fund().unwrap(), Money::ZERO);
        assert_eq!(lender.available_fund().unwrap(), Money::from_minor(1_000_000));
        assert!(lender.fund_pool().unwrap().is_balanced());

        let events = lender.take_events().unwrap();
        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|e| e.resulting_status() == Some(LoanStatus::Expired)));
    }

    #[test]
    fn test_refused_moves_leave_state_untouched() {
        let time = test_time();
        let lender = lender(350_000, &time);
        let id = lender.qualify_loan(fully_qualified()).unwrap().id();
        lender.process(id).unwrap();
        lender.applicant_reply(id, false).unwrap();
        let before = lender.get(id).unwrap();
        let pool = lender.fund_pool().unwrap();

        assert!(lender.applicant_reply(id, true).is_err());
        assert!(lender.process(id).is_err());
        assert!(lender.retry(id).is_err());

        assert_eq!(lender.get(id).unwrap(), before);
        assert_eq!(lender.fund_pool().unwrap(), pool);
    }

    #[test]
    fn test_invalid_config_refused() {
        let mut config = LenderConfig::standard();
        config.qualification.savings_multiplier = 0;

        let result = Lender::builder().config(config).build();
        assert!(matches!(result, Err(LenderError::InvalidConfiguration { .. })));
    }
}
