// 📈 Interest Calculator - simple (non-compounding) interest
// interest = principal * (rate / 100) * (duration_months / 12)
// Rate is a whole-number percent; duration converts to a year fraction.
// No currency rounding happens here - callers needing fixed-point money
// semantics round at the presentation boundary.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Compute simple interest. Pure; non-negative inputs yield a
/// non-negative result.
pub fn calculate_interest(principal: Decimal, rate: Decimal, duration_months: u32) -> Decimal {
    principal * (rate / dec!(100)) * (Decimal::from(duration_months) / dec!(12))
}

// ============================================================================
// TESTS
// ============================================================================
