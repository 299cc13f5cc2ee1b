// ✅ Loan Approval Policy - admission control
// Strict two-sided bound: approve iff 0 < principal <= limit. Amounts of
// zero or below, and amounts strictly over the limit, are both rejected.
// There is no partial or conditional approval tier, and rejection is a
// valid terminal outcome, not an error.

use crate::validation;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Default upper bound on an approvable principal.
pub const DEFAULT_APPROVAL_LIMIT: Decimal = dec!(1000);

// ============================================================================
// DECISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanDecision {
    Approved,
    Rejected,
}

impl LoanDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, LoanDecision::Approved)
    }
}

// ============================================================================
// POLICY
// ============================================================================

/// Decision function mapping a requested principal to approve/reject.
pub struct LoanApprovalPolicy {
    /// Inclusive upper bound for approval.
    pub limit: Decimal,
}

impl LoanApprovalPolicy {
    pub fn new() -> Self {
        LoanApprovalPolicy {
            limit: DEFAULT_APPROVAL_LIMIT,
        }
    }

    pub fn with_limit(limit: Decimal) -> Self {
        LoanApprovalPolicy { limit }
    }

    /// Approve iff `0 < principal <= limit`.
    pub fn decide(&self, principal: Decimal) -> LoanDecision {
        if validation::is_positive(principal)
            && validation::is_within_range(principal, Decimal::ZERO, self.limit)
        {
            LoanDecision::Approved
        } else {
            LoanDecision::Rejected
        }
    }
}

impl Default for LoanApprovalPolicy {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
