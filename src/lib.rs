// Loan Ledger Engine - Core Library
// Exposes all modules for use in the demo binary and tests

pub mod engine;
pub mod error;
pub mod interest;
pub mod ledger;
pub mod policy;
pub mod ranking;
pub mod registry;
pub mod shards;
pub mod snapshot;
pub mod validation;

// Re-export commonly used types
pub use engine::{LoanLedger, DEFAULT_REPAYMENT_INCREMENT};
pub use error::{LedgerError, Result};
pub use interest::calculate_interest;
pub use ledger::{
    increment, run_repayment_schedule, AccountRecord, BalanceLedger, RepaymentRun,
};
pub use policy::{LoanApprovalPolicy, LoanDecision, DEFAULT_APPROVAL_LIMIT};
pub use ranking::{
    is_sorted_ascending, rank, sort_by_amount, sort_loans_by_amount, RankingReport,
};
pub use registry::{Loan, LoanState, Registry, User, MAX_LOANS, MAX_USERS};
pub use shards::{find_across_shards, locate, Shard, ShardHit, ShardSet};
pub use snapshot::LedgerSnapshot;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
