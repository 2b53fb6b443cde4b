//! Product types.

use crate::error::CommerceError;
use crate::ids::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product status in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    /// Product is being prepared and cannot be ordered.
    #[default]
    #[serde(rename = "P")]
    Prototype,
    /// Product can be ordered.
    #[serde(rename = "A")]
    Available,
    /// Product is no longer sold.
    #[serde(rename = "D")]
    Discontinued,
}

impl ProductStatus {
    /// Short persisted code.
    pub fn code(&self) -> &'static str {
        match self {
            ProductStatus::Prototype => "P",
            ProductStatus::Available => "A",
            ProductStatus::Discontinued => "D",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Prototype => "Prototype",
            ProductStatus::Available => "Available",
            ProductStatus::Discontinued => "Discontinued",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(ProductStatus::Prototype),
            "A" => Ok(ProductStatus::Available),
            "D" => Ok(ProductStatus::Discontinued),
            _ => Err(CommerceError::unknown_code("product status", s)),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A product in the catalog.
///
/// Deserialization runs the same checks as the setters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    /// Unique product identifier.
    id: ProductId,
    /// Product name.
    name: String,
    /// Availability status.
    status: ProductStatus,
    /// Unit price, never negative.
    price: Decimal,
    /// Units on hand.
    stock: i64,
}

impl Product {
    /// Create a new prototype product with no price and no stock.
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: ProductStatus::Prototype,
            price: Decimal::ZERO,
            stock: 0,
        }
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_status(&mut self, status: ProductStatus) {
        self.status = status;
    }

    /// Set the units on hand. Negative stock is rejected.
    pub fn set_stock(&mut self, stock: i64) -> Result<(), CommerceError> {
        check_stock(stock)?;
        self.stock = stock;
        Ok(())
    }

    /// Set the unit price. Negative prices are rejected.
    pub fn set_price(&mut self, price: Decimal) -> Result<(), CommerceError> {
        if price < Decimal::ZERO {
            return Err(CommerceError::NegativePrice(price.to_string()));
        }
        self.price = price;
        Ok(())
    }

    /// Check if the product can be ordered at all.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Available
    }

    /// Check whether `quantity` units can be ordered right now.
    ///
    /// Checks run in order: quantity, status, stock. Stock is not reserved.
    pub fn can_be_ordered(&self, quantity: i64) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if !self.is_available() {
            return Err(CommerceError::ProductUnavailable {
                product_id: self.id.to_string(),
                status: self.status.label(),
            });
        }
        if self.stock < quantity {
            return Err(CommerceError::InsufficientStock {
                product_id: self.id.to_string(),
                requested: quantity,
                available: self.stock,
            });
        }
        Ok(())
    }

    /// Remove `quantity` units from stock after an order commits them.
    pub(crate) fn decrement_stock(&mut self, quantity: i64) {
        self.stock -= quantity;
    }
}

/// Product fields as stored, before validation.
#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    status: ProductStatus,
    price: Decimal,
    stock: i64,
}

impl TryFrom<ProductRecord> for Product {
    type Error = CommerceError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let mut product = Product::new(record.id, record.name);
        product.set_status(record.status);
        product.set_price(record.price)?;
        product.set_stock(record.stock)?;
        Ok(product)
    }
}

/// Reject stock below zero.
pub(crate) fn check_stock(stock: i64) -> Result<(), CommerceError> {
    if stock < 0 {
        return Err(CommerceError::NegativeStock(stock));
    }
    Ok(())
}
