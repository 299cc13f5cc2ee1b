// 💾 Snapshot Persistence - (user_count, loan_count, loans[], accounts[])
// JSON serialization of the whole engine state. Loading never trusts the
// file: every registry and ledger invariant is re-validated before a
// snapshot is allowed to become a live engine.

use crate::engine::LoanLedger;
use crate::error::{LedgerError, Result};
use crate::ledger::{AccountRecord, BalanceLedger};
use crate::registry::{Loan, LoanState, Registry, User, MAX_LOANS, MAX_USERS};
use crate::validation;
use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Serialized engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub user_count: usize,
    pub loan_count: usize,
    pub users: Vec<User>,
    pub loans: Vec<Loan>,
    pub accounts: Vec<AccountRecord>,
    pub captured_at: DateTime<Utc>,
}

impl LedgerSnapshot {
    /// Capture a consistent point-in-time snapshot of an engine.
    pub fn capture(engine: &LoanLedger) -> Self {
        let users = engine.registry().users_snapshot();
        let loans = engine.registry().loans_snapshot();
        let accounts = engine.ledger().snapshot();

        LedgerSnapshot {
            user_count: users.len(),
            loan_count: loans.len(),
            users,
            loans,
            accounts,
            captured_at: Utc::now(),
        }
    }

    /// Re-check every invariant the live engine maintains. Called on
    /// load, before any snapshot data reaches a registry or ledger.
    pub fn validate(&self) -> Result<()> {
        if self.user_count != self.users.len() || self.user_count > MAX_USERS {
            return Err(LedgerError::CorruptSnapshot(format!(
                "user count {} does not match {} records (capacity {})",
                self.user_count,
                self.users.len(),
                MAX_USERS
            )));
        }
        if self.loan_count != self.loans.len() || self.loan_count > MAX_LOANS {
            return Err(LedgerError::CorruptSnapshot(format!(
                "loan count {} does not match {} records (capacity {})",
                self.loan_count,
                self.loans.len(),
                MAX_LOANS
            )));
        }

        // Dense, gap-free ids in registration order
        for (slot, user) in self.users.iter().enumerate() {
            if user.id as usize != slot {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "user id {} found in slot {}",
                    user.id, slot
                )));
            }
        }

        for (slot, loan) in self.loans.iter().enumerate() {
            if loan.id as usize != slot {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "loan id {} found in slot {}",
                    loan.id, slot
                )));
            }
            if loan.principal < Decimal::ZERO || loan.rate < Decimal::ZERO {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "loan {} carries a negative principal or rate",
                    loan.id
                )));
            }
            if !validation::is_within_range(loan.outstanding, Decimal::ZERO, loan.principal) {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "loan {} outstanding {} outside [0, {}]",
                    loan.id, loan.outstanding, loan.principal
                )));
            }
            if loan.state == LoanState::Closed && loan.outstanding != Decimal::ZERO {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "closed loan {} still owes {}",
                    loan.id, loan.outstanding
                )));
            }
            if let Some(account_id) = loan.funding_account {
                if account_id as usize >= self.accounts.len() {
                    return Err(LedgerError::CorruptSnapshot(format!(
                        "loan {} references unknown account {}",
                        loan.id, account_id
                    )));
                }
            }
        }

        for (slot, account) in self.accounts.iter().enumerate() {
            if !validation::is_non_negative(account.balance) {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "account {} holds negative balance {}",
                    slot, account.balance
                )));
            }
        }

        Ok(())
    }

    /// Rebuild a live engine. Validation runs first; a snapshot that
    /// fails it never becomes an engine.
    pub fn restore(&self) -> Result<LoanLedger> {
        self.validate()?;

        let registry = Registry::from_parts(self.users.clone(), self.loans.clone());
        let ledger = BalanceLedger::from_records(self.accounts.clone());
        Ok(LoanLedger::from_parts(registry, ledger))
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write snapshot file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Read a snapshot from JSON. Does not validate; callers go through
    /// `restore` before using the data.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read snapshot file: {:?}", path.as_ref()))?;
        let snapshot: LedgerSnapshot =
            serde_json::from_str(&content).context("Failed to parse snapshot JSON")?;
        Ok(snapshot)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn populated_engine() -> LoanLedger {
        let engine = LoanLedger::new();
        let owner = engine.register_user().unwrap();
        engine.register_user().unwrap();
        let account = engine.open_account(owner, dec!(2000)).unwrap();

        let loan_id = engine
            .request_loan(dec!(600), dec!(5), 12, Some("equipment".to_string()))
            .unwrap();
        engine.approve_loan(loan_id).unwrap();
        engine.disburse(loan_id, account).unwrap();
        engine
    }

    #[test]
    fn test_capture_round_trip() {
        let engine = populated_engine();
        let snapshot = LedgerSnapshot::capture(&engine);

        assert_eq!(snapshot.user_count, 2);
        assert_eq!(snapshot.loan_count, 1);
        assert_eq!(snapshot.accounts.len(), 1);
        snapshot.validate().unwrap();

        let restored = snapshot.restore().unwrap();
        assert_eq!(restored.registry().user_count(), 2);
        assert_eq!(restored.balance_of(0).unwrap(), dec!(1400));

        let loan = restored.loan(0).unwrap();
        assert_eq!(loan.state, LoanState::Disbursed);
        assert_eq!(loan.funding_account, Some(0));

        // The restored engine keeps operating: finish the lifecycle
        restored.repay(0).unwrap();
        assert_eq!(restored.balance_of(0).unwrap(), dec!(2000));
    }

    #[test]
    fn test_json_round_trip() {
        let engine = populated_engine();
        let snapshot = LedgerSnapshot::capture(&engine);

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: LedgerSnapshot = serde_json::from_str(&json).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.loans[0].principal, dec!(600));
    }

    #[test]
    fn test_rejects_count_mismatch() {
        let engine = populated_engine();
        let mut snapshot = LedgerSnapshot::capture(&engine);
        snapshot.user_count = 5;

        assert!(matches!(
            snapshot.validate().unwrap_err(),
            LedgerError::CorruptSnapshot(_)
        ));
        assert!(snapshot.restore().is_err());
    }

    #[test]
    fn test_rejects_id_gaps() {
        let engine = populated_engine();
        let mut snapshot = LedgerSnapshot::capture(&engine);
        snapshot.loans[0].id = 40;

        let err = snapshot.validate().unwrap_err();
        assert!(err.to_string().contains("loan id 40"));
    }

    #[test]
    fn test_rejects_negative_balance() {
        let engine = populated_engine();
        let mut snapshot = LedgerSnapshot::capture(&engine);
        snapshot.accounts[0].balance = dec!(-10);

        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_rejects_dangling_funding_account() {
        let engine = populated_engine();
        let mut snapshot = LedgerSnapshot::capture(&engine);
        snapshot.loans[0].funding_account = Some(9);

        let err = snapshot.validate().unwrap_err();
        assert!(err.to_string().contains("unknown account 9"));
    }

    #[test]
    fn test_rejects_closed_loan_with_outstanding_debt() {
        let engine = populated_engine();
        let mut snapshot = LedgerSnapshot::capture(&engine);
        snapshot.loans[0].state = LoanState::Closed;
        // outstanding still 600: contradiction

        let err = snapshot.validate().unwrap_err();
        assert!(err.to_string().contains("still owes"));
    }

    #[test]
    fn test_file_round_trip() {
        let engine = populated_engine();
        let snapshot = LedgerSnapshot::capture(&engine);

        let path = std::env::temp_dir().join("loan_ledger_snapshot_test.json");
        snapshot.save_to_file(&path).unwrap();
        let loaded = LedgerSnapshot::load_from_file(&path).unwrap();
        fs::remove_file(&path).ok();

        loaded.restore().unwrap();
        assert_eq!(loaded.loan_count, 1);
    }
}
