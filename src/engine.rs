// ⚙️ Loan Ledger Engine - composition root
// Wires the registry, approval policy, interest calculator, and balance
// ledger into the loan lifecycle:
//
//   request → approve/reject → disburse → repay → closed
//
// State transitions run under the registry lock, so check-then-mutate
// sequences are atomic per loan. The engine performs no I/O; the
// presentation layer renders whatever these operations return.

use crate::error::{LedgerError, Result};
use crate::interest;
use crate::ledger::{self, BalanceLedger, RepaymentRun};
use crate::policy::{LoanApprovalPolicy, LoanDecision};
use crate::registry::{Loan, LoanState, Registry};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default fixed increment for repayment schedules.
pub const DEFAULT_REPAYMENT_INCREMENT: Decimal = dec!(100);

// ============================================================================
// ENGINE
// ============================================================================

/// The loan ledger engine. Owns the registry and balance ledger
/// exclusively; callers go through the operations below, never through
/// raw storage.
pub struct LoanLedger {
    registry: Registry,
    ledger: BalanceLedger,
    policy: LoanApprovalPolicy,
    repayment_increment: Decimal,
}

impl LoanLedger {
    pub fn new() -> Self {
        LoanLedger {
            registry: Registry::new(),
            ledger: BalanceLedger::new(),
            policy: LoanApprovalPolicy::new(),
            repayment_increment: DEFAULT_REPAYMENT_INCREMENT,
        }
    }

    pub fn with_policy(policy: LoanApprovalPolicy) -> Self {
        LoanLedger {
            policy,
            ..Self::new()
        }
    }

    /// Rebuild an engine from persisted parts (see snapshot module).
    pub(crate) fn from_parts(registry: Registry, ledger: BalanceLedger) -> Self {
        LoanLedger {
            registry,
            ledger,
            policy: LoanApprovalPolicy::new(),
            repayment_increment: DEFAULT_REPAYMENT_INCREMENT,
        }
    }

    /// Builder: override the fixed repayment increment.
    pub fn with_repayment_increment(mut self, increment: Decimal) -> Self {
        self.repayment_increment = increment;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    pub fn register_user(&self) -> Result<u32> {
        self.registry.register_user()
    }

    pub fn request_loan(
        &self,
        principal: Decimal,
        rate: Decimal,
        duration_months: i64,
        collateral_tag: Option<String>,
    ) -> Result<u32> {
        self.registry
            .request_loan(principal, rate, duration_months, collateral_tag)
    }

    pub fn open_account(&self, owner_id: u32, opening_balance: Decimal) -> Result<u32> {
        self.ledger.open_account(owner_id, opening_balance)
    }

    // ========================================================================
    // ADMISSION
    // ========================================================================

    /// Decide a requested loan. Idempotent: re-invoking on a loan that
    /// already carries a decision returns the stored decision without
    /// re-deciding.
    pub fn approve_loan(&self, loan_id: u32) -> Result<LoanDecision> {
        self.registry.update_loan(loan_id, |loan| match loan.state {
            LoanState::Requested => {
                let decision = self.policy.decide(loan.principal);
                loan.state = match decision {
                    LoanDecision::Approved => LoanState::Approved,
                    LoanDecision::Rejected => LoanState::Rejected,
                };
                loan.decided_at = Some(Utc::now());
                Ok(decision)
            }
            LoanState::Rejected => Ok(LoanDecision::Rejected),
            // Any loan past admission was approved
            LoanState::Approved | LoanState::Disbursed | LoanState::Repaying | LoanState::Closed => {
                Ok(LoanDecision::Approved)
            }
        })
    }

    // ========================================================================
    // PRICING
    // ========================================================================

    /// Simple-interest pricing; pure delegation.
    pub fn calculate_interest(&self, principal: Decimal, rate: Decimal, duration_months: u32) -> Decimal {
        interest::calculate_interest(principal, rate, duration_months)
    }

    /// Interest quote for a registered loan.
    pub fn quote(&self, loan_id: u32) -> Result<Decimal> {
        let loan = self.registry.loan(loan_id)?;
        Ok(interest::calculate_interest(
            loan.principal,
            loan.rate,
            loan.duration_months,
        ))
    }

    // ========================================================================
    // FUNDS MOVEMENT
    // ========================================================================

    /// Direct debit against an account; see `BalanceLedger::lend`.
    pub fn lend(&self, account_id: u32, amount: Decimal) -> Result<()> {
        self.ledger.lend(account_id, amount)
    }

    /// Disburse an approved loan from `account_id`: debits the principal
    /// and links the loan to its funding account.
    ///
    /// The debit happens first; if the account cannot cover the
    /// principal, the loan is left untouched in `Approved`.
    pub fn disburse(&self, loan_id: u32, account_id: u32) -> Result<()> {
        self.registry.update_loan(loan_id, |loan| {
            match loan.state {
                LoanState::Approved => {}
                LoanState::Rejected | LoanState::Closed => {
                    return Err(LedgerError::AlreadyClosed(loan_id));
                }
                other => {
                    return Err(LedgerError::NotDisbursable {
                        loan_id,
                        state: other.as_str(),
                    });
                }
            }

            self.ledger.lend(account_id, loan.principal)?;
            loan.state = LoanState::Disbursed;
            loan.funding_account = Some(account_id);
            loan.outstanding = loan.principal;
            Ok(())
        })
    }

    /// Drive a loan's outstanding amount to exactly zero via the
    /// fixed-increment schedule, credit the funding account (when one is
    /// linked), and close the loan.
    ///
    /// Fails with `NotFound` for an unknown id and `AlreadyClosed` for a
    /// loan in a terminal state (`Rejected` or `Closed`). A failed
    /// schedule or credit is a strict no-op: the loan keeps its prior
    /// state and outstanding amount.
    pub fn repay(&self, loan_id: u32) -> Result<RepaymentRun> {
        self.registry.update_loan(loan_id, |loan| {
            if loan.state.is_terminal() {
                return Err(LedgerError::AlreadyClosed(loan_id));
            }

            // All fallible work happens before any mutation
            let run = ledger::run_repayment_schedule(loan.outstanding, self.repayment_increment)?;

            if let Some(account_id) = loan.funding_account {
                if loan.outstanding > Decimal::ZERO {
                    self.ledger.credit(account_id, loan.outstanding)?;
                }
            }

            loan.outstanding = Decimal::ZERO;
            loan.state = LoanState::Closed;
            loan.closed_at = Some(Utc::now());
            Ok(run)
        })
    }

    // ========================================================================
    // READ SIDE
    // ========================================================================

    pub fn loan(&self, loan_id: u32) -> Result<Loan> {
        self.registry.loan(loan_id)
    }

    pub fn balance_of(&self, account_id: u32) -> Result<Decimal> {
        self.ledger.balance_of(account_id)
    }
}

impl Default for LoanLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_funded_account() -> (LoanLedger, u32) {
        let engine = LoanLedger::new();
        let owner = engine.register_user().unwrap();
        let account = engine.open_account(owner, dec!(5000)).unwrap();
        (engine, account)
    }

    #[test]
    fn test_full_lifecycle() {
        let (engine, account) = engine_with_funded_account();

        let loan_id = engine
            .request_loan(dec!(1000), dec!(5), 12, None)
            .unwrap();
        assert_eq!(engine.loan(loan_id).unwrap().state, LoanState::Requested);

        assert_eq!(engine.approve_loan(loan_id).unwrap(), LoanDecision::Approved);
        assert_eq!(engine.loan(loan_id).unwrap().state, LoanState::Approved);

        assert_eq!(engine.quote(loan_id).unwrap(), dec!(50));

        engine.disburse(loan_id, account).unwrap();
        let loan = engine.loan(loan_id).unwrap();
        assert_eq!(loan.state, LoanState::Disbursed);
        assert_eq!(loan.funding_account, Some(account));
        assert_eq!(engine.balance_of(account).unwrap(), dec!(4000));

        let run = engine.repay(loan_id).unwrap();
        assert_eq!(run.steps, 10);
        assert_eq!(run.accumulator, dec!(1000));

        let loan = engine.loan(loan_id).unwrap();
        assert_eq!(loan.state, LoanState::Closed);
        assert_eq!(loan.outstanding, dec!(0));
        assert!(loan.closed_at.is_some());

        // The principal flowed back; the pool is conserved
        assert_eq!(engine.balance_of(account).unwrap(), dec!(5000));
    }

    #[test]
    fn test_approval_is_idempotent_on_terminal_states() {
        let (engine, _) = engine_with_funded_account();

        let approved = engine.request_loan(dec!(500), dec!(5), 12, None).unwrap();
        let rejected = engine.request_loan(dec!(1001), dec!(5), 12, None).unwrap();

        assert_eq!(engine.approve_loan(approved).unwrap(), LoanDecision::Approved);
        assert_eq!(engine.approve_loan(rejected).unwrap(), LoanDecision::Rejected);

        // Re-invocation returns the stored decision without re-deciding
        assert_eq!(engine.approve_loan(approved).unwrap(), LoanDecision::Approved);
        assert_eq!(engine.approve_loan(rejected).unwrap(), LoanDecision::Rejected);
        assert_eq!(engine.loan(rejected).unwrap().state, LoanState::Rejected);
    }

    #[test]
    fn test_approve_unknown_loan() {
        let engine = LoanLedger::new();
        assert_eq!(engine.approve_loan(9).unwrap_err(), LedgerError::NotFound(9));
    }

    #[test]
    fn test_disburse_requires_approval() {
        let (engine, account) = engine_with_funded_account();
        let loan_id = engine.request_loan(dec!(500), dec!(5), 12, None).unwrap();

        let err = engine.disburse(loan_id, account).unwrap_err();
        assert_eq!(
            err,
            LedgerError::NotDisbursable {
                loan_id,
                state: "Requested",
            }
        );
    }

    #[test]
    fn test_disburse_refused_leaves_loan_approved() {
        let engine = LoanLedger::new();
        let owner = engine.register_user().unwrap();
        let poor_account = engine.open_account(owner, dec!(100)).unwrap();

        let loan_id = engine.request_loan(dec!(500), dec!(5), 12, None).unwrap();
        engine.approve_loan(loan_id).unwrap();

        let err = engine.disburse(loan_id, poor_account).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

        // No-op on refusal: loan still Approved, balance untouched
        assert_eq!(engine.loan(loan_id).unwrap().state, LoanState::Approved);
        assert_eq!(engine.balance_of(poor_account).unwrap(), dec!(100));
    }

    #[test]
    fn test_repay_terminates_on_uneven_principal() {
        let (engine, account) = engine_with_funded_account();

        let loan_id = engine.request_loan(dec!(950), dec!(5), 12, None).unwrap();
        engine.approve_loan(loan_id).unwrap();
        engine.disburse(loan_id, account).unwrap();

        let run = engine.repay(loan_id).unwrap();
        assert_eq!(run.steps, 10);
        assert_eq!(run.accumulator, dec!(1000));
        assert_eq!(engine.loan(loan_id).unwrap().outstanding, dec!(0));
    }

    #[test]
    fn test_repay_errors() {
        let (engine, account) = engine_with_funded_account();

        assert_eq!(engine.repay(7).unwrap_err(), LedgerError::NotFound(7));

        let rejected = engine.request_loan(dec!(2000), dec!(5), 12, None).unwrap();
        engine.approve_loan(rejected).unwrap();
        assert_eq!(
            engine.repay(rejected).unwrap_err(),
            LedgerError::AlreadyClosed(rejected)
        );

        let loan_id = engine.request_loan(dec!(300), dec!(5), 12, None).unwrap();
        engine.approve_loan(loan_id).unwrap();
        engine.disburse(loan_id, account).unwrap();
        engine.repay(loan_id).unwrap();
        assert_eq!(
            engine.repay(loan_id).unwrap_err(),
            LedgerError::AlreadyClosed(loan_id)
        );
    }

    #[test]
    fn test_failed_repay_is_a_no_op() {
        let engine = LoanLedger::new().with_repayment_increment(dec!(0));
        let loan_id = engine.request_loan(dec!(500), dec!(5), 12, None).unwrap();
        engine.approve_loan(loan_id).unwrap();

        let err = engine.repay(loan_id).unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount(dec!(0)));

        // The error branch leaves the loan exactly as it was
        let loan = engine.loan(loan_id).unwrap();
        assert_eq!(loan.state, LoanState::Approved);
        assert_eq!(loan.outstanding, dec!(500));
        assert!(loan.closed_at.is_none());
    }

    #[test]
    fn test_failed_repay_after_disbursement_is_a_no_op() {
        let engine = LoanLedger::new().with_repayment_increment(dec!(-5));
        let owner = engine.register_user().unwrap();
        let account = engine.open_account(owner, dec!(1000)).unwrap();

        let loan_id = engine.request_loan(dec!(300), dec!(5), 12, None).unwrap();
        engine.approve_loan(loan_id).unwrap();
        engine.disburse(loan_id, account).unwrap();

        assert!(engine.repay(loan_id).is_err());
        let loan = engine.loan(loan_id).unwrap();
        assert_eq!(loan.state, LoanState::Disbursed);
        assert_eq!(loan.outstanding, dec!(300));
        assert_eq!(engine.balance_of(account).unwrap(), dec!(700));
    }

    #[test]
    fn test_repay_unbounded_principal_fails_cleanly() {
        let engine = LoanLedger::new();

        // The registry admits any non-negative principal; only approved
        // loans are policy-bounded. The schedule must refuse, not spin.
        let loan_id = engine
            .request_loan(dec!(100000000000000000000), dec!(0), 0, None)
            .unwrap();

        assert_eq!(engine.repay(loan_id).unwrap_err(), LedgerError::Overflow);
        let loan = engine.loan(loan_id).unwrap();
        assert_eq!(loan.state, LoanState::Requested);
        assert_eq!(loan.outstanding, dec!(100000000000000000000));
    }

    #[test]
    fn test_custom_policy_limit() {
        let engine = LoanLedger::with_policy(LoanApprovalPolicy::with_limit(dec!(200)));
        let loan_id = engine.request_loan(dec!(500), dec!(5), 12, None).unwrap();
        assert_eq!(engine.approve_loan(loan_id).unwrap(), LoanDecision::Rejected);
    }

    #[test]
    fn test_custom_repayment_increment() {
        let engine = LoanLedger::new().with_repayment_increment(dec!(250));
        let loan_id = engine.request_loan(dec!(1000), dec!(0), 6, None).unwrap();
        engine.approve_loan(loan_id).unwrap();

        // Repayment straight from Approved: nothing was disbursed, so no
        // account is credited, but the schedule still runs to zero
        let run = engine.repay(loan_id).unwrap();
        assert_eq!(run.steps, 4);
        assert_eq!(engine.loan(loan_id).unwrap().state, LoanState::Closed);
    }
}
