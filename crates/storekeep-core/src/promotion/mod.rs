//! Promotion module.
//!
//! Contains coupons and the rules deciding when they apply.

mod coupon;

pub use coupon::{Coupon, CouponKind, CouponStatus};
