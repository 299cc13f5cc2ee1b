// 📊 Loan Ranking - deterministic ordering for reporting
// Produces a fresh ascending sequence; stable on ties, input untouched.
// The contract is "ascending order, permutation of the input" - the
// standard stable sort satisfies it in O(n log n).

use crate::registry::Loan;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sort a loan-amount sequence ascending. Returns a new sequence; the
/// input collection is not mutated.
pub fn sort_by_amount(amounts: &[Decimal]) -> Vec<Decimal> {
    let mut ordered = amounts.to_vec();
    ordered.sort();
    ordered
}

/// Sort loans ascending by principal, stable on ties (original relative
/// order preserved among equal principals).
pub fn sort_loans_by_amount(loans: &[Loan]) -> Vec<Loan> {
    let mut ordered = loans.to_vec();
    ordered.sort_by_key(|loan| loan.principal);
    ordered
}

/// True iff every adjacent pair satisfies `amount[i] <= amount[i+1]`.
pub fn is_sorted_ascending(amounts: &[Decimal]) -> bool {
    amounts.windows(2).all(|pair| pair[0] <= pair[1])
}

// ============================================================================
// RANKING REPORT
// ============================================================================

/// Summary view over an ordered amount sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub ordered: Vec<Decimal>,
    pub count: usize,
    pub smallest: Option<Decimal>,
    pub largest: Option<Decimal>,
    pub total: Decimal,
}

impl RankingReport {
    pub fn summary(&self) -> String {
        match (self.smallest, self.largest) {
            (Some(smallest), Some(largest)) => format!(
                "{} loans ranked: smallest {}, largest {}, total {}",
                self.count, smallest, largest, self.total
            ),
            _ => "0 loans ranked".to_string(),
        }
    }
}

/// Rank a loan-amount sequence and summarize it.
pub fn rank(amounts: &[Decimal]) -> RankingReport {
    let ordered = sort_by_amount(amounts);
    RankingReport {
        count: ordered.len(),
        smallest: ordered.first().copied(),
        largest: ordered.last().copied(),
        total: ordered.iter().copied().sum(),
        ordered,
    }
}

// ============================================================================
// TESTS
// ============================================================================
