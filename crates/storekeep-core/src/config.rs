//! Defaults applied when new entities are created.

use crate::promotion::{CouponKind, CouponStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Defaults for newly created coupons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouponDefaults {
    /// Length of the validity window in days, starting today at midnight UTC.
    pub validity_days: i64,
    /// Discount kind.
    pub kind: CouponKind,
    /// Discount value.
    pub value: Decimal,
    /// Initial status.
    pub status: CouponStatus,
    /// Initial redemption stock.
    pub stock: i64,
}

impl Default for CouponDefaults {
    fn default() -> Self {
        Self {
            validity_days: 90,
            kind: CouponKind::Percentage,
            value: Decimal::TEN,
            status: CouponStatus::Inactive,
            stock: 0,
        }
    }
}
