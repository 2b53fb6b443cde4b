//! Checkout module.
//!
//! Contains orders, their line items, and shipping details.

mod item;
mod order;
mod shipping;

pub use item::Item;
pub use order::{Order, OrderLine, OrderStatus, OrderSummary};
pub use shipping::{Shipping, ShippingStatus};
