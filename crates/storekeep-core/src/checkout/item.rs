//! Order line items.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{ItemId, OrderId, ProductId};
use crate::shared::Shared;

/// A line binding one product to a quantity within one order.
///
/// The order owns its items; `order_id` is a lookup key back to it. The
/// product handle is used for price and stock reads and never outlives the
/// product's own lifecycle decisions.
#[derive(Debug, Clone)]
pub struct Item {
    id: ItemId,
    order_id: OrderId,
    product_id: ProductId,
    product: Shared<Product>,
    quantity: i64,
}

impl Item {
    /// Create an empty line for `product`.
    ///
    /// Locks the product briefly to read its id.
    pub fn new(id: ItemId, order_id: OrderId, product: Shared<Product>) -> Self {
        let product_id = product.lock().id().clone();
        Self {
            id,
            order_id,
            product_id,
            product,
            quantity: 0,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn product(&self) -> &Shared<Product> {
        &self.product
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Add `delta` units. The result must stay above zero.
    pub fn add_quantity(&mut self, delta: i64) -> Result<(), CommerceError> {
        let quantity = self
            .quantity
            .checked_add(delta)
            .ok_or(CommerceError::QuantityOverflow {
                current: self.quantity,
                delta,
            })?;
        if quantity <= 0 {
            return Err(CommerceError::QuantityNotPositive(quantity));
        }
        self.quantity = quantity;
        Ok(())
    }

    /// Remove `delta` units. The result must stay above zero.
    pub fn subtract_quantity(&mut self, delta: i64) -> Result<(), CommerceError> {
        let negated = delta.checked_neg().ok_or(CommerceError::QuantityOverflow {
            current: self.quantity,
            delta,
        })?;
        self.add_quantity(negated)
    }
}
