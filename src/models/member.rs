//! Membership tiers and member profiles

use rust_decimal::Decimal;

/// Membership tier attached to a borrower
///
/// Gold members pay half the base daily fine rate. Anything unknown or
/// absent is treated as Silver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MembershipTier {
    #[default]
    Silver,
    Gold,
}

impl MembershipTier {
    /// Parse a tier label, defaulting to Silver for unrecognized input
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "gold" => MembershipTier::Gold,
            _ => MembershipTier::Silver,
        }
    }

    /// Multiplier applied to the base daily fine rate
    pub fn rate_multiplier(&self) -> Decimal {
        match self {
            MembershipTier::Silver => Decimal::ONE,
            // 0.5
            MembershipTier::Gold => Decimal::new(5, 1),
        }
    }
}

impl std::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MembershipTier::Silver => "Silver",
            MembershipTier::Gold => "Gold",
        };
        write!(f, "{}", label)
    }
}

/// Member record as stored in the member directory
#[derive(Debug, Clone)]
pub struct MemberProfile {
    pub username: String,
    pub tier: MembershipTier,
    pub contact: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tier_defaults_to_silver() {
        assert_eq!(MembershipTier::from_label("platinum"), MembershipTier::Silver);
        assert_eq!(MembershipTier::from_label(""), MembershipTier::Silver);
        assert_eq!(MembershipTier::from_label(" GOLD "), MembershipTier::Gold);
    }

    #[test]
    fn gold_halves_the_rate() {
        assert_eq!(MembershipTier::Gold.rate_multiplier(), Decimal::new(5, 1));
        assert_eq!(MembershipTier::Silver.rate_multiplier(), Decimal::ONE);
    }
}
