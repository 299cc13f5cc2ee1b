// ⚠️ Error Kinds - every refusal names the rule that failed
// All failures are returned as values; nothing here aborts the process.
// Business refusals (rejection, insufficient funds) are normal outcomes,
// not defects - the only fatal condition in this crate is an internal
// invariant violation, which is a debug_assert, never a LedgerError.

use rust_decimal::Decimal;
use thiserror::Error;

/// Engine errors. Each variant carries enough context for the
/// presentation layer to produce an actionable message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A bounded registry is full. No slot is consumed by the failed call.
    #[error("{registry} registry is full (capacity {capacity})")]
    CapacityExceeded {
        registry: &'static str,
        capacity: usize,
    },

    #[error("loan principal must be non-negative, got {0}")]
    InvalidLoanAmount(Decimal),

    #[error("interest rate must be non-negative, got {0}")]
    InvalidRate(Decimal),

    #[error("loan duration must be non-negative, got {0} months")]
    InvalidDuration(i64),

    /// A ledger movement with a non-positive or malformed amount.
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Business-rule refusal: the account cannot cover the debit.
    /// The balance reported here is the balance left untouched.
    #[error("account {account_id} holds {balance}, cannot lend {requested}")]
    InsufficientFunds {
        account_id: u32,
        balance: Decimal,
        requested: Decimal,
    },

    /// A bad account index. The ledger state is unchanged.
    #[error("account index {index} is out of range (ledger holds {len})")]
    OutOfRange { index: u32, len: usize },

    /// Arithmetic would exceed the representable range.
    #[error("arithmetic overflow: amount exceeds representable range")]
    Overflow,

    #[error("loan {0} does not exist")]
    NotFound(u32),

    /// Repayment or disbursement requested on a terminal loan.
    #[error("loan {0} is already in a terminal state")]
    AlreadyClosed(u32),

    /// Disbursement requested on a loan that has not been approved.
    #[error("loan {loan_id} cannot be disbursed from state {state}")]
    NotDisbursable { loan_id: u32, state: &'static str },

    /// Shards hold disjoint key sets; a key may live in exactly one.
    #[error("key {key} is already owned by shard {shard_id}")]
    DuplicateKey { key: i64, shard_id: u32 },

    /// A persisted snapshot failed invariant re-validation on load.
    #[error("snapshot failed invariant re-validation: {0}")]
    CorruptSnapshot(String),
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, LedgerError>;

// ============================================================================
// TESTS
// ============================================================================
