//! Tier-based fine strategy
//!
//! Pure arithmetic only. Tier defaulting for unknown users happens at the
//! call sites, not here.

use rust_decimal::Decimal;

use crate::models::member::MembershipTier;

/// Compute the total fine for a loan `overdue_days` late
///
/// Silver pays the full daily rate, Gold pays half. Zero days or a zero
/// rate yields exactly zero for any tier. Negative day counts are clamped.
pub fn calculate(overdue_days: i64, daily_rate: Decimal, tier: MembershipTier) -> Decimal {
    Decimal::from(overdue_days.max(0)) * daily_rate * tier.rate_multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silver_charges_the_full_rate() {
        let fine = calculate(10, Decimal::new(10, 1), MembershipTier::Silver);
        assert_eq!(fine, Decimal::new(100, 1)); // 10.0
    }

    #[test]
    fn gold_charges_half_the_rate() {
        let fine = calculate(10, Decimal::new(10, 1), MembershipTier::Gold);
        assert_eq!(fine, Decimal::new(50, 1)); // 5.0
    }

    #[test]
    fn zero_days_or_zero_rate_is_exactly_zero() {
        assert_eq!(calculate(0, Decimal::new(20, 1), MembershipTier::Silver), Decimal::ZERO);
        assert_eq!(calculate(0, Decimal::new(20, 1), MembershipTier::Gold), Decimal::ZERO);
        assert_eq!(calculate(14, Decimal::ZERO, MembershipTier::Silver), Decimal::ZERO);
    }

    #[test]
    fn gold_never_exceeds_silver() {
        for days in [0i64, 1, 7, 30, 365] {
            for rate in [Decimal::ZERO, Decimal::new(10, 1), Decimal::new(20, 1)] {
                let silver = calculate(days, rate, MembershipTier::Silver);
                let gold = calculate(days, rate, MembershipTier::Gold);
                assert!(gold <= silver, "gold > silver for {} days at {}", days, rate);
                assert!(gold >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn negative_days_are_clamped_to_zero() {
        assert_eq!(calculate(-3, Decimal::new(10, 1), MembershipTier::Silver), Decimal::ZERO);
    }
}
