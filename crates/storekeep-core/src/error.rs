//! Commerce error types.

use thiserror::Error;

/// Errors raised by product, coupon and order operations.
///
/// A failed operation never leaves the entity it was called on half-updated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Unknown status or kind code.
    #[error("unknown {kind} code: {code:?}")]
    UnknownCode { kind: &'static str, code: String },

    /// Negative product price.
    #[error("price must not be negative: {0}")]
    NegativePrice(String),

    /// Product or coupon stock below zero.
    #[error("stock must not be negative: {0}")]
    NegativeStock(i64),

    /// Coupon value of zero or below.
    #[error("coupon value must be greater than zero: {0}")]
    NonPositiveCouponValue(String),

    /// Percentage coupon value outside (0, 100).
    #[error("percentage coupon value must be below 100: {0}")]
    PercentageOutOfRange(String),

    /// Coupon start date after its end date.
    #[error("coupon validity window is inverted: starts {start}, ends {end}")]
    InvalidValidityWindow { start: String, end: String },

    /// Operation attempted in the wrong lifecycle state.
    #[error("cannot {action} order {order_id} while it is {status}")]
    InvalidTransition {
        order_id: String,
        action: &'static str,
        status: &'static str,
    },

    /// Requested quantity of zero or below.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Product is not available for ordering.
    #[error("product {product_id} is not available (status {status})")]
    ProductUnavailable {
        product_id: String,
        status: &'static str,
    },

    /// Not enough stock to satisfy the request.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Coupon status is not active.
    #[error("coupon {coupon_id} is not active (status {status})")]
    CouponInactive {
        coupon_id: String,
        status: &'static str,
    },

    /// Coupon validity window has not started.
    #[error("coupon {0} is not valid yet")]
    CouponNotStarted(String),

    /// Coupon validity window has ended.
    #[error("coupon {0} has expired")]
    CouponExpired(String),

    /// Coupon has no redemptions left.
    #[error("coupon {0} is out of stock")]
    CouponOutOfStock(String),

    /// Order has no items.
    #[error("order {0} has no items")]
    EmptyOrder(String),

    /// Product is not part of the order.
    #[error("product {product_id} is not in order {order_id}")]
    ProductNotInOrder { order_id: String, product_id: String },

    /// Order total would be zero or negative after discount.
    #[error("order amount must be greater than zero, got {0}")]
    NonPositiveAmount(String),

    /// Quantity arithmetic overflowed.
    #[error("quantity overflow: {current} + {delta}")]
    QuantityOverflow { current: i64, delta: i64 },

    /// Quantity change would drive an item to zero or below.
    #[error("item quantity must stay above zero, got {0}")]
    QuantityNotPositive(i64),

    /// Amount arithmetic overflowed.
    #[error("arithmetic overflow in amount calculation")]
    AmountOverflow,

    /// An item was rejected while validating the order.
    #[error("item {item_id} rejected: {source}")]
    ItemRejected {
        item_id: String,
        #[source]
        source: Box<CommerceError>,
    },

    /// The coupon could not be applied to the order.
    #[error("coupon {coupon_id} rejected: {source}")]
    CouponRejected {
        coupon_id: String,
        #[source]
        source: Box<CommerceError>,
    },
}

impl CommerceError {
    /// Build an unknown-code error.
    pub fn unknown_code(kind: &'static str, code: impl Into<String>) -> Self {
        CommerceError::UnknownCode {
            kind,
            code: code.into(),
        }
    }

    /// Check if this is a lifecycle state mismatch.
    pub fn is_state_mismatch(&self) -> bool {
        matches!(self, CommerceError::InvalidTransition { .. })
    }

    /// Check if this is a capacity exhaustion (stock or coupon redemptions).
    pub fn is_capacity_exhausted(&self) -> bool {
        match self {
            CommerceError::InsufficientStock { .. } | CommerceError::CouponOutOfStock(_) => true,
            CommerceError::ItemRejected { source, .. }
            | CommerceError::CouponRejected { source, .. } => source.is_capacity_exhausted(),
            _ => false,
        }
    }

    /// Strip workflow context and return the underlying cause.
    pub fn root_cause(&self) -> &CommerceError {
        match self {
            CommerceError::ItemRejected { source, .. }
            | CommerceError::CouponRejected { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
