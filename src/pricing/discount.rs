//! Volume discount schedule applied to marketplace commission.

use serde::Serialize;

/// One step of the schedule: `rate` applies from `min_orders` upwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiscountTier {
    pub min_orders: i64,
    pub rate: f64,
}

/// Cutoffs, highest first. The first tier whose threshold is met wins.
pub static VOLUME_TIERS: [DiscountTier; 3] = [
    DiscountTier { min_orders: 10_000, rate: 0.15 },
    DiscountTier { min_orders: 5_000, rate: 0.10 },
    DiscountTier { min_orders: 1_000, rate: 0.05 },
];

/// Tier reached by a monthly order count, if any.
pub fn tier_for(orders_count: i64) -> Option<&'static DiscountTier> {
    VOLUME_TIERS.iter().find(|t| orders_count >= t.min_orders)
}

/// Discount fraction for a monthly order count.
pub fn volume_discount(orders_count: i64) -> f64 {
    tier_for(orders_count).map_or(0.0, |t| t.rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive_cutoffs() {
        let cases = [
            (0, 0.0),
            (999, 0.0),
            (1_000, 0.05),
            (4_999, 0.05),
            (5_000, 0.10),
            (9_999, 0.10),
            (10_000, 0.15),
            (1_000_000, 0.15),
            (-5, 0.0),
        ];
        for (orders, expected) in cases {
            assert_eq!(volume_discount(orders), expected, "orders = {orders}");
        }
    }

    #[test]
    fn tier_reports_threshold() {
        assert_eq!(tier_for(7_500).map(|t| t.min_orders), Some(5_000));
        assert!(tier_for(10).is_none());
    }
}
