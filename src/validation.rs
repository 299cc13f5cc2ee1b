// 🔍 Amount Validation - pure numeric predicates
// Shared guards for every mutating operation. No side effects, no
// failure modes, no rounding: comparisons use Decimal's native ordering.

use rust_decimal::Decimal;

/// True iff `x >= 0`.
pub fn is_non_negative(x: Decimal) -> bool {
    x >= Decimal::ZERO
}

/// True iff `x > 0`. Strict guard shared by lend/credit amounts.
pub fn is_positive(x: Decimal) -> bool {
    x > Decimal::ZERO
}

/// True iff `lo <= x <= hi` (both bounds inclusive).
pub fn is_within_range(x: Decimal, lo: Decimal, hi: Decimal) -> bool {
    lo <= x && x <= hi
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_non_negative() {
        assert!(is_non_negative(dec!(0)));
        assert!(is_non_negative(dec!(0.01)));
        assert!(is_non_negative(dec!(1000)));
        assert!(!is_non_negative(dec!(-0.01)));
    }

    #[test]
    fn test_positive_is_strict() {
        assert!(is_positive(dec!(0.01)));
        assert!(!is_positive(dec!(0)));
        assert!(!is_positive(dec!(-5)));
    }

    #[test]
    fn test_within_range_inclusive_bounds() {
        assert!(is_within_range(dec!(0), dec!(0), dec!(1000)));
        assert!(is_within_range(dec!(1000), dec!(0), dec!(1000)));
        assert!(is_within_range(dec!(500), dec!(0), dec!(1000)));
        assert!(!is_within_range(dec!(1000.01), dec!(0), dec!(1000)));
        assert!(!is_within_range(dec!(-1), dec!(0), dec!(1000)));
    }
}
