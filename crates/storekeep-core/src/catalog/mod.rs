//! Product catalog module.
//!
//! Contains the product entity and its availability rules.

mod product;

pub(crate) use product::check_stock;
pub use product::{Product, ProductStatus};
