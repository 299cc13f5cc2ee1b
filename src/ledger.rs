// 💰 Balance Ledger - per-account balance store
// Invariant: every balance is >= 0 at every observable point. A debit
// that would drive a balance negative is refused outright, never clamped.
// Invalid requests (bad id, non-positive amount, insufficient funds) are
// strict no-ops: the ledger is unchanged and the caller learns which
// condition failed.
//
// Locking: the slot vector sits behind a RwLock (taken for write only
// when opening accounts); each balance has its own Mutex, so mutations
// on distinct accounts proceed in parallel while a single account is
// single-writer.

use crate::error::{LedgerError, Result};
use crate::validation;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, RwLock};

// ============================================================================
// ACCOUNT RECORDS
// ============================================================================

/// Plain serializable account view, used by snapshots and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub owner_id: u32,
    pub balance: Decimal,
}

struct AccountSlot {
    owner_id: u32,
    balance: Mutex<Decimal>,
}

// ============================================================================
// BALANCE LEDGER
// ============================================================================

/// Mutable per-account balance store. The ledger exclusively owns its
/// slots; callers only reach balances through the operations below.
pub struct BalanceLedger {
    accounts: RwLock<Vec<AccountSlot>>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        BalanceLedger {
            accounts: RwLock::new(Vec::new()),
        }
    }

    /// Rebuild a ledger from persisted records. Invariants must have
    /// been re-validated by the caller (see snapshot module).
    pub(crate) fn from_records(records: Vec<AccountRecord>) -> Self {
        let slots = records
            .into_iter()
            .map(|r| AccountSlot {
                owner_id: r.owner_id,
                balance: Mutex::new(r.balance),
            })
            .collect();
        BalanceLedger {
            accounts: RwLock::new(slots),
        }
    }

    /// Open an account with a non-negative opening balance; returns the
    /// dense account id.
    pub fn open_account(&self, owner_id: u32, opening_balance: Decimal) -> Result<u32> {
        if !validation::is_non_negative(opening_balance) {
            return Err(LedgerError::InvalidAmount(opening_balance));
        }

        let mut accounts = self.accounts.write().unwrap();
        let id = accounts.len() as u32;
        accounts.push(AccountSlot {
            owner_id,
            balance: Mutex::new(opening_balance),
        });
        Ok(id)
    }

    /// Debit `amount` from an account (the disbursement leg).
    ///
    /// Checks, in order: account index (`OutOfRange`), amount positivity
    /// (`InvalidAmount`), then coverage (`InsufficientFunds`). Success
    /// leaves the balance >= 0 by the coverage precondition.
    pub fn lend(&self, account_id: u32, amount: Decimal) -> Result<()> {
        let accounts = self.accounts.read().unwrap();
        let slot = accounts
            .get(account_id as usize)
            .ok_or(LedgerError::OutOfRange {
                index: account_id,
                len: accounts.len(),
            })?;

        if !validation::is_positive(amount) {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut balance = slot.balance.lock().unwrap();
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account_id,
                balance: *balance,
                requested: amount,
            });
        }

        *balance -= amount;

        // A negative balance after a successful debit is an engine bug,
        // not bad input.
        debug_assert!(validation::is_non_negative(*balance));
        Ok(())
    }

    /// Credit `amount` to an account (the repayment leg).
    pub fn credit(&self, account_id: u32, amount: Decimal) -> Result<()> {
        let accounts = self.accounts.read().unwrap();
        let slot = accounts
            .get(account_id as usize)
            .ok_or(LedgerError::OutOfRange {
                index: account_id,
                len: accounts.len(),
            })?;

        if !validation::is_positive(amount) {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut balance = slot.balance.lock().unwrap();
        *balance = increment(*balance, amount)?;
        Ok(())
    }

    pub fn balance_of(&self, account_id: u32) -> Result<Decimal> {
        let accounts = self.accounts.read().unwrap();
        let slot = accounts
            .get(account_id as usize)
            .ok_or(LedgerError::OutOfRange {
                index: account_id,
                len: accounts.len(),
            })?;
        let balance = slot.balance.lock().unwrap();
        Ok(*balance)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().unwrap().len()
    }

    /// Consistent point-in-time copy of every account, for reporting
    /// and persistence.
    pub fn snapshot(&self) -> Vec<AccountRecord> {
        let accounts = self.accounts.read().unwrap();
        accounts
            .iter()
            .map(|slot| AccountRecord {
                owner_id: slot.owner_id,
                balance: *slot.balance.lock().unwrap(),
            })
            .collect()
    }
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PURE BOOKKEEPING HELPERS
// ============================================================================

/// Checked combine: `prior + delta`, failing with `Overflow` if the sum
/// leaves the representable range. `delta` is left unchanged (pure).
pub fn increment(prior: Decimal, delta: Decimal) -> Result<Decimal> {
    prior.checked_add(delta).ok_or(LedgerError::Overflow)
}

/// Outcome of a completed repayment schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepaymentRun {
    /// Number of fixed increments applied.
    pub steps: u32,

    /// Final accumulator value; reaches-or-exceeds the outstanding amount.
    pub accumulator: Decimal,
}

/// Run a fixed-increment repayment schedule against `outstanding`.
///
/// The accumulator grows monotonically from zero in `increment_size`
/// steps until it reaches or exceeds `outstanding`, completing in
/// `ceil(outstanding / increment_size)` steps. The step count is
/// computed arithmetically, so an outstanding amount too large for the
/// schedule fails with `Overflow` up front instead of iterating.
pub fn run_repayment_schedule(outstanding: Decimal, increment_size: Decimal) -> Result<RepaymentRun> {
    if !validation::is_positive(increment_size) {
        return Err(LedgerError::InvalidAmount(increment_size));
    }
    if !validation::is_non_negative(outstanding) {
        return Err(LedgerError::InvalidAmount(outstanding));
    }
    if outstanding.is_zero() {
        return Ok(RepaymentRun {
            steps: 0,
            accumulator: Decimal::ZERO,
        });
    }

    let increments = outstanding
        .checked_div(increment_size)
        .ok_or(LedgerError::Overflow)?
        .ceil();
    let steps = increments.to_u32().ok_or(LedgerError::Overflow)?;
    let accumulator = increments
        .checked_mul(increment_size)
        .ok_or(LedgerError::Overflow)?;

    // Coverage invariant: the accumulator reaches-or-exceeds the debt
    debug_assert!(accumulator >= outstanding);
    Ok(RepaymentRun { steps, accumulator })
}

// ============================================================================
// TESTS
// ============================================================================
