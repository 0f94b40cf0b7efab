use serde::Serialize;

pub const FREE_TIER_ID: &str = "free";
pub const PREMIUM_TIER_ID: &str = "premium";

/// Encounters a free user may record before being asked to upgrade.
pub const FREE_ENCOUNTER_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionTier {
    pub id: &'static str,
    pub name: &'static str,
    /// Monthly price in whole US dollars.
    pub price: u32,
    pub features: &'static [&'static str],
    pub is_popular: bool,
}

pub const SUBSCRIPTION_TIERS: [SubscriptionTier; 2] = [
    SubscriptionTier {
        id: FREE_TIER_ID,
        name: "Free",
        price: 0,
        features: &[
            "Basic state-specific guides",
            "English language support",
            "Limited encounter recording",
        ],
        is_popular: false,
    },
    SubscriptionTier {
        id: PREMIUM_TIER_ID,
        name: "Premium",
        price: 5,
        features: &[
            "All state-specific guides",
            "English & Spanish support",
            "Unlimited encounter recording",
            "Real-time incident sharing",
            "Priority support",
        ],
        is_popular: true,
    },
];

pub fn find_tier(id: &str) -> Option<&'static SubscriptionTier> {
    SUBSCRIPTION_TIERS.iter().find(|t| t.id == id)
}

/// "$5.00" style price label.
pub fn format_price(dollars: u32) -> String {
    format!("${dollars}.00")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tier() {
        assert_eq!(find_tier("premium").map(|t| t.price), Some(5));
        assert!(find_tier("gold").is_none());
    }

    #[test]
    fn test_only_premium_is_popular() {
        let popular: Vec<_> = SUBSCRIPTION_TIERS.iter().filter(|t| t.is_popular).collect();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].id, PREMIUM_TIER_ID);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0), "$0.00");
        assert_eq!(format_price(5), "$5.00");
    }
}
