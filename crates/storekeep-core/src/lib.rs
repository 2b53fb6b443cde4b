//! Order, product and coupon domain model for storekeep.
//!
//! - **Catalog**: products, their price, stock and availability
//! - **Promotion**: coupons with validity windows and limited redemptions
//! - **Checkout**: orders, line items, submission and fulfilment
//!
//! Products and coupons are shared between orders through [`Shared`] handles.
//! Submitting an order locks every product it touches, plus the coupon, for
//! the duration of the check-and-commit, so concurrent submissions never
//! oversell stock.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_decimal::Decimal;
//! use storekeep_core::prelude::*;
//!
//! let clock: Arc<dyn Clock> = Arc::new(SystemClock);
//!
//! let mut book = Product::new(ProductId::new("book"), "Rust Book");
//! book.set_status(ProductStatus::Available);
//! book.set_price(Decimal::from(40)).unwrap();
//! book.set_stock(10).unwrap();
//! let book = Shared::new(book);
//!
//! let mut order = Order::new(OrderId::generate(), clock);
//! order.add_product(&book, 2).unwrap();
//! order.submit("Ann", "1 Main St", None).unwrap();
//!
//! assert_eq!(order.amount(), Decimal::from(80));
//! assert_eq!(book.lock().stock(), 8);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod shared;

pub mod catalog;
pub mod checkout;
pub mod promotion;

pub use error::CommerceError;
pub use ids::*;
pub use shared::Shared;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::config::CouponDefaults;
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::shared::Shared;

    // Catalog
    pub use crate::catalog::{Product, ProductStatus};

    // Promotion
    pub use crate::promotion::{Coupon, CouponKind, CouponStatus};

    // Checkout
    pub use crate::checkout::{
        Item, Order, OrderLine, OrderStatus, OrderSummary, Shipping, ShippingStatus,
    };
}
