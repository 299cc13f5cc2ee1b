// 🗂️ Bounded Registries - Users and Loans
// Append-only registries with a strict capacity bound and dense id
// assignment: ids are consecutive integers starting at zero, assigned in
// registration order, never reused. Counters only grow; there is no
// decrement operation. Closed loans stay on the books for audit.

use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Capacity bound for the user registry.
pub const MAX_USERS: usize = 100;

/// Capacity bound for the loan registry.
pub const MAX_LOANS: usize = 100;

// ============================================================================
// LOAN STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanState {
    /// Requested, awaiting an approval decision.
    Requested,

    /// Admitted by the approval policy, awaiting disbursement.
    Approved,

    /// Refused by the approval policy. Terminal; not an error.
    Rejected,

    /// Funds debited from the funding account.
    Disbursed,

    /// Repayment schedule in progress.
    Repaying,

    /// Fully repaid. Terminal; kept for audit.
    Closed,
}

impl LoanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanState::Requested => "Requested",
            LoanState::Approved => "Approved",
            LoanState::Rejected => "Rejected",
            LoanState::Disbursed => "Disbursed",
            LoanState::Repaying => "Repaying",
            LoanState::Closed => "Closed",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanState::Rejected | LoanState::Closed)
    }
}

// ============================================================================
// USER ENTITY
// ============================================================================

/// A registered user. Identity is the registry slot: `id` equals the
/// user count at registration time and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub registered_at: DateTime<Utc>,
}

// ============================================================================
// LOAN ENTITY
// ============================================================================

/// A loan record. Created in `Requested`, mutated only through the
/// engine's state transitions, never physically removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    /// Dense registry id (equals loan count at request time).
    pub id: u32,

    /// Requested amount, before interest.
    pub principal: Decimal,

    /// Simple interest rate as a whole-number percent.
    pub rate: Decimal,

    /// Duration in months.
    pub duration_months: u32,

    /// Optional short collateral descriptor.
    pub collateral_tag: Option<String>,

    pub state: LoanState,

    /// Amount still owed. Equals principal until repayment completes,
    /// then exactly zero.
    pub outstanding: Decimal,

    /// Funding account id, set at disbursement. Non-owning back-reference.
    pub funding_account: Option<u32>,

    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// REGISTRY
// ============================================================================

struct RegistryState {
    users: Vec<User>,
    loans: Vec<Loan>,
}

/// Bounded user/loan registry.
///
/// The single mutex is the serialization point that keeps id assignment
/// dense and gap-free under concurrent registration. The registry
/// exclusively owns its records; callers get clones, never slots.
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            state: Mutex::new(RegistryState {
                users: Vec::new(),
                loans: Vec::new(),
            }),
        }
    }

    /// Rebuild a registry from persisted records. Invariants must have
    /// been re-validated by the caller (see snapshot module).
    pub(crate) fn from_parts(users: Vec<User>, loans: Vec<Loan>) -> Self {
        Registry {
            state: Mutex::new(RegistryState { users, loans }),
        }
    }

    /// Register a new user and return its dense id.
    ///
    /// Fails with `CapacityExceeded` once the registry holds `MAX_USERS`
    /// users; the failed call consumes no slot.
    pub fn register_user(&self) -> Result<u32> {
        let mut state = self.state.lock().unwrap();
        if state.users.len() >= MAX_USERS {
            return Err(LedgerError::CapacityExceeded {
                registry: "user",
                capacity: MAX_USERS,
            });
        }

        let id = state.users.len() as u32;
        state.users.push(User {
            id,
            registered_at: Utc::now(),
        });
        Ok(id)
    }

    /// Create a loan in `Requested` state and return its dense id.
    ///
    /// Validation order: principal, rate, duration, then capacity. A zero
    /// principal is admitted here and rejected later by the approval
    /// policy; only a negative principal is malformed.
    pub fn request_loan(
        &self,
        principal: Decimal,
        rate: Decimal,
        duration_months: i64,
        collateral_tag: Option<String>,
    ) -> Result<u32> {
        if principal < Decimal::ZERO {
            return Err(LedgerError::InvalidLoanAmount(principal));
        }
        if rate < Decimal::ZERO {
            return Err(LedgerError::InvalidRate(rate));
        }
        if duration_months < 0 || duration_months > i64::from(u32::MAX) {
            return Err(LedgerError::InvalidDuration(duration_months));
        }

        let mut state = self.state.lock().unwrap();
        if state.loans.len() >= MAX_LOANS {
            return Err(LedgerError::CapacityExceeded {
                registry: "loan",
                capacity: MAX_LOANS,
            });
        }

        let id = state.loans.len() as u32;
        state.loans.push(Loan {
            id,
            principal,
            rate,
            duration_months: duration_months as u32,
            collateral_tag,
            state: LoanState::Requested,
            outstanding: principal,
            funding_account: None,
            requested_at: Utc::now(),
            decided_at: None,
            closed_at: None,
        });
        Ok(id)
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn loan_count(&self) -> usize {
        self.state.lock().unwrap().loans.len()
    }

    /// Fetch a loan by id (cloned out from under the lock).
    pub fn loan(&self, loan_id: u32) -> Result<Loan> {
        let state = self.state.lock().unwrap();
        state
            .loans
            .get(loan_id as usize)
            .cloned()
            .ok_or(LedgerError::NotFound(loan_id))
    }

    /// Consistent point-in-time copy of all loans, for the read-side
    /// utilities (ranking, reporting, persistence).
    pub fn loans_snapshot(&self) -> Vec<Loan> {
        self.state.lock().unwrap().loans.clone()
    }

    pub fn users_snapshot(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }

    /// Apply a state transition to one loan while holding the registry
    /// lock, so the check-then-mutate sequence is atomic.
    pub(crate) fn update_loan<T, F>(&self, loan_id: u32, f: F) -> Result<T>
    where
        F: FnOnce(&mut Loan) -> Result<T>,
    {
        let mut state = self.state.lock().unwrap();
        let loan = state
            .loans
            .get_mut(loan_id as usize)
            .ok_or(LedgerError::NotFound(loan_id))?;
        f(loan)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
