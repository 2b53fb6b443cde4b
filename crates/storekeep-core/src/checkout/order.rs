//! Order types and the order lifecycle.
//!
//! An order starts as a draft, collects items, and is then driven through
//! `Draft -> Submitted -> Processed -> Delivered`, with `Submitted -> Canceled`
//! as the only side branch. No transition can be undone.

use crate::catalog::Product;
use crate::checkout::{Item, Shipping, ShippingStatus};
use crate::clock::Clock;
use crate::error::CommerceError;
use crate::ids::{CouponId, ItemId, OrderId, ProductId};
use crate::promotion::Coupon;
use crate::shared::Shared;
use chrono::{DateTime, Utc};
use parking_lot::MutexGuard;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Being assembled; the only state in which items may change.
    #[default]
    #[serde(rename = "D")]
    Draft,
    /// Stock and coupon committed.
    #[serde(rename = "S")]
    Submitted,
    /// Withdrawn after submission.
    #[serde(rename = "C")]
    Canceled,
    /// Accepted for fulfilment.
    #[serde(rename = "P")]
    Processed,
    /// Received by the customer.
    #[serde(rename = "DL")]
    Delivered,
}

impl OrderStatus {
    /// Short persisted code.
    pub fn code(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "D",
            OrderStatus::Submitted => "S",
            OrderStatus::Canceled => "C",
            OrderStatus::Processed => "P",
            OrderStatus::Delivered => "DL",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "Draft",
            OrderStatus::Submitted => "Submitted",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Processed => "Processed",
            OrderStatus::Delivered => "Delivered",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Canceled | OrderStatus::Delivered)
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" => Ok(OrderStatus::Draft),
            "S" => Ok(OrderStatus::Submitted),
            "C" => Ok(OrderStatus::Canceled),
            "P" => Ok(OrderStatus::Processed),
            "DL" => Ok(OrderStatus::Delivered),
            _ => Err(CommerceError::unknown_code("order status", s)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A customer order.
///
/// Items are keyed by product id, so adding a product twice merges into one
/// line, and products are always visited (and locked) in ascending id order.
pub struct Order {
    /// Unique order identifier.
    id: OrderId,
    /// When the order was created.
    created_date: DateTime<Utc>,
    /// When the order was submitted; the Unix epoch until then.
    submitted_date: DateTime<Utc>,
    /// When the order was processed; the Unix epoch until then.
    processed_date: DateTime<Utc>,
    /// Lifecycle status.
    status: OrderStatus,
    /// Lines keyed by product.
    items: BTreeMap<ProductId, Item>,
    /// Coupon redeemed at submission.
    coupon: Option<Shared<Coupon>>,
    /// Total charged, after discount.
    amount: Decimal,
    /// Recipient and delivery progress.
    shipping: Shipping,
    clock: Arc<dyn Clock>,
}

impl Order {
    /// Create an empty draft order.
    pub fn new(id: OrderId, clock: Arc<dyn Clock>) -> Self {
        Self {
            id,
            created_date: clock.now(),
            submitted_date: DateTime::<Utc>::default(),
            processed_date: DateTime::<Utc>::default(),
            status: OrderStatus::Draft,
            items: BTreeMap::new(),
            coupon: None,
            amount: Decimal::ZERO,
            shipping: Shipping::default(),
            clock,
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn submitted_date(&self) -> DateTime<Utc> {
        self.submitted_date
    }

    pub fn processed_date(&self) -> DateTime<Utc> {
        self.processed_date
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn shipping(&self) -> &Shipping {
        &self.shipping
    }

    pub fn coupon(&self) -> Option<&Shared<Coupon>> {
        self.coupon.as_ref()
    }

    /// Items in ascending product-id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// The line for `product_id`, if present.
    pub fn item(&self, product_id: &ProductId) -> Option<&Item> {
        self.items.get(product_id)
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Check whether the order has a line for `product_id`.
    pub fn has_product(&self, product_id: &ProductId) -> bool {
        self.items.contains_key(product_id)
    }

    /// Add `quantity` units of `product`.
    ///
    /// A product already in the order has its line increased, after checking
    /// the combined quantity against the product. Stock is not reserved.
    pub fn add_product(
        &mut self,
        product: &Shared<Product>,
        quantity: i64,
    ) -> Result<ItemId, CommerceError> {
        self.require(OrderStatus::Draft, "add products to")?;

        let product_id = {
            let guard = product.lock();
            let product_id = guard.id().clone();
            let total = match self.items.get(&product_id) {
                Some(item) => item.quantity().checked_add(quantity).ok_or(
                    CommerceError::QuantityOverflow {
                        current: item.quantity(),
                        delta: quantity,
                    },
                )?,
                None => quantity,
            };
            guard.can_be_ordered(total)?;
            product_id
        };

        let order_id = self.id.clone();
        let item = self
            .items
            .entry(product_id.clone())
            .or_insert_with(|| Item::new(ItemId::generate(), order_id, product.clone()));
        if let Err(err) = item.add_quantity(quantity) {
            if item.quantity() == 0 {
                self.items.remove(&product_id);
            }
            return Err(err);
        }

        debug!(order_id = %self.id, product_id = %product_id, quantity, "product added");
        Ok(self.items[&product_id].id().clone())
    }

    /// Change the quantity of a product already in the order by `quantity`.
    ///
    /// `quantity` is added to the line, so a negative value reduces it. The
    /// resulting total is checked against the product.
    pub fn edit_product(
        &mut self,
        product: &Shared<Product>,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        self.require(OrderStatus::Draft, "edit products in")?;

        let guard = product.lock();
        let Some(item) = self.items.get_mut(guard.id()) else {
            return Err(CommerceError::ProductNotInOrder {
                order_id: self.id.to_string(),
                product_id: guard.id().to_string(),
            });
        };
        let total = item
            .quantity()
            .checked_add(quantity)
            .ok_or(CommerceError::QuantityOverflow {
                current: item.quantity(),
                delta: quantity,
            })?;
        guard.can_be_ordered(total)?;
        item.add_quantity(quantity)?;

        debug!(order_id = %self.id, product_id = %guard.id(), quantity = total, "product edited");
        Ok(())
    }

    /// Remove a product's line entirely.
    pub fn delete_product(&mut self, product_id: &ProductId) -> Result<(), CommerceError> {
        self.require(OrderStatus::Draft, "remove products from")?;

        if self.items.remove(product_id).is_none() {
            return Err(CommerceError::ProductNotInOrder {
                order_id: self.id.to_string(),
                product_id: product_id.to_string(),
            });
        }

        debug!(order_id = %self.id, product_id = %product_id, "product removed");
        Ok(())
    }

    /// Price the current items, optionally with `coupon`, without changing anything.
    ///
    /// Uses current prices regardless of product status or stock.
    pub fn quote(&self, coupon: Option<&Coupon>) -> Result<Decimal, CommerceError> {
        let lines = self
            .items
            .values()
            .map(|item| (item.product().lock().price(), item.quantity()));
        price(subtotal(lines)?, coupon)
    }

    /// Recompute the amount. The stored amount only changes on success.
    pub fn calculate_amount(&mut self, coupon: Option<&Coupon>) -> Result<Decimal, CommerceError> {
        let amount = self.quote(coupon)?;
        self.amount = amount;
        Ok(amount)
    }

    /// Submit the order, committing stock and the optional coupon.
    ///
    /// Every product in the order and the coupon are locked for the whole
    /// call, products first in ascending id order. All items are re-checked,
    /// the coupon validated and the amount priced before anything is written,
    /// so a failure leaves order, products and coupon stock untouched. A
    /// coupon whose window is closed still has its status updated.
    ///
    /// Callers must not hold any of those locks when calling.
    #[instrument(skip_all, fields(order_id = %self.id))]
    pub fn submit(
        &mut self,
        shipping_name: impl Into<String>,
        shipping_address: impl Into<String>,
        coupon: Option<&Shared<Coupon>>,
    ) -> Result<(), CommerceError> {
        self.require(OrderStatus::Draft, "submit")?;
        if self.items.is_empty() {
            warn!("submission rejected: no items");
            return Err(CommerceError::EmptyOrder(self.id.to_string()));
        }

        let now = self.clock.now();
        let mut products: Vec<MutexGuard<'_, Product>> =
            self.items.values().map(|item| item.product().lock()).collect();

        for (item, product) in self.items.values().zip(&products) {
            if let Err(source) = product.can_be_ordered(item.quantity()) {
                warn!(item_id = %item.id(), error = %source, "submission rejected");
                return Err(CommerceError::ItemRejected {
                    item_id: item.id().to_string(),
                    source: Box::new(source),
                });
            }
        }

        let subtotal = subtotal(
            self.items
                .values()
                .zip(&products)
                .map(|(item, product)| (product.price(), item.quantity())),
        )?;

        let mut coupon_guard = coupon.map(Shared::lock);
        let amount = match coupon_guard.as_deref_mut() {
            Some(coupon) => {
                let applied = coupon
                    .can_be_applied(now)
                    .and_then(|()| price(subtotal, Some(&*coupon)));
                match applied {
                    Ok(amount) => amount,
                    Err(source) => {
                        warn!(coupon_id = %coupon.id(), error = %source, "coupon rejected");
                        return Err(CommerceError::CouponRejected {
                            coupon_id: coupon.id().to_string(),
                            source: Box::new(source),
                        });
                    }
                }
            }
            None => price(subtotal, None)?,
        };

        if let Some(coupon) = coupon_guard.as_deref_mut() {
            coupon.redeem();
        }
        for (item, product) in self.items.values().zip(products.iter_mut()) {
            product.decrement_stock(item.quantity());
        }
        drop(coupon_guard);
        drop(products);

        self.coupon = coupon.cloned();
        self.amount = amount;
        self.status = OrderStatus::Submitted;
        self.submitted_date = now;
        self.shipping = Shipping {
            name: shipping_name.into(),
            address: shipping_address.into(),
            status: ShippingStatus::None,
            tracking_id: None,
        };

        info!(status = self.status.code(), amount = %self.amount, "order submitted");
        Ok(())
    }

    /// Accept a submitted order for fulfilment.
    pub fn process(&mut self) -> Result<(), CommerceError> {
        self.require(OrderStatus::Submitted, "process")?;
        self.status = OrderStatus::Processed;
        self.processed_date = self.clock.now();
        info!(order_id = %self.id, status = self.status.code(), "order processed");
        Ok(())
    }

    /// Withdraw a submitted order. Committed stock is not returned.
    pub fn cancel(&mut self) -> Result<(), CommerceError> {
        self.require(OrderStatus::Submitted, "cancel")?;
        self.status = OrderStatus::Canceled;
        info!(order_id = %self.id, status = self.status.code(), "order canceled");
        Ok(())
    }

    /// Hand a processed order to the carrier.
    pub fn process_shipping(&mut self, tracking_id: impl Into<String>) -> Result<(), CommerceError> {
        self.require(OrderStatus::Processed, "ship")?;
        if self.shipping.status != ShippingStatus::None {
            return Err(CommerceError::InvalidTransition {
                order_id: self.id.to_string(),
                action: "ship",
                status: self.shipping.status.label(),
            });
        }
        let tracking_id = tracking_id.into();
        info!(order_id = %self.id, tracking_id = %tracking_id, "order shipped");
        self.shipping.tracking_id = Some(tracking_id);
        self.shipping.status = ShippingStatus::OnProcess;
        Ok(())
    }

    /// Mark a processed order as delivered.
    pub fn finish(&mut self) -> Result<(), CommerceError> {
        self.require(OrderStatus::Processed, "finish")?;
        self.status = OrderStatus::Delivered;
        self.shipping.status = ShippingStatus::Delivered;
        info!(order_id = %self.id, status = self.status.code(), "order delivered");
        Ok(())
    }

    /// Serializable snapshot of the order and its lines.
    pub fn summary(&self) -> OrderSummary {
        let lines = self
            .items
            .values()
            .map(|item| {
                let product = item.product().lock();
                OrderLine {
                    item_id: item.id().clone(),
                    product_id: item.product_id().clone(),
                    product_name: product.name().to_string(),
                    unit_price: product.price(),
                    quantity: item.quantity(),
                }
            })
            .collect();

        OrderSummary {
            id: self.id.clone(),
            status: self.status,
            amount: self.amount,
            created_date: self.created_date,
            submitted_date: self.submitted_date,
            processed_date: self.processed_date,
            coupon_id: self.coupon.as_ref().map(|c| c.lock().id().clone()),
            shipping: self.shipping.clone(),
            lines,
        }
    }

    fn require(&self, expected: OrderStatus, action: &'static str) -> Result<(), CommerceError> {
        if self.status != expected {
            return Err(CommerceError::InvalidTransition {
                order_id: self.id.to_string(),
                action,
                status: self.status.label(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("amount", &self.amount)
            .field("items", &self.items.len())
            .field("shipping", &self.shipping)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub amount: Decimal,
    pub created_date: DateTime<Utc>,
    pub submitted_date: DateTime<Utc>,
    pub processed_date: DateTime<Utc>,
    pub coupon_id: Option<CouponId>,
    pub shipping: Shipping,
    pub lines: Vec<OrderLine>,
}

/// One line of an [`OrderSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
}

/// Sum of `price * quantity` over all lines.
fn subtotal(mut lines: impl Iterator<Item = (Decimal, i64)>) -> Result<Decimal, CommerceError> {
    lines.try_fold(Decimal::ZERO, |acc, (price, quantity)| {
        price
            .checked_mul(Decimal::from(quantity))
            .and_then(|line| acc.checked_add(line))
            .ok_or(CommerceError::AmountOverflow)
    })
}

/// Apply the optional coupon to `subtotal`. The result must be positive.
fn price(subtotal: Decimal, coupon: Option<&Coupon>) -> Result<Decimal, CommerceError> {
    let amount = match coupon {
        Some(coupon) => subtotal
            .checked_sub(coupon.discount_for(subtotal)?)
            .ok_or(CommerceError::AmountOverflow)?,
        None => subtotal,
    };
    if amount <= Decimal::ZERO {
        return Err(CommerceError::NonPositiveAmount(amount.to_string()));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductStatus;
    use crate::clock::FixedClock;
    use crate::promotion::{CouponKind, CouponStatus};
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn product(id: &str, price: i64, stock: i64) -> Shared<Product> {
        let mut product = Product::new(ProductId::new(id), id.to_uppercase());
        product.set_status(ProductStatus::Available);
        product.set_price(Decimal::from(price)).unwrap();
        product.set_stock(stock).unwrap();
        Shared::new(product)
    }

    fn draft(clock: &Arc<FixedClock>) -> Order {
        Order::new(OrderId::new("o-1"), clock.clone())
    }

    #[test]
    fn test_new_order() {
        let clock = clock();
        let order = draft(&clock);

        assert_eq!(order.status(), OrderStatus::Draft);
        assert_eq!(order.amount(), Decimal::ZERO);
        assert_eq!(order.created_date(), clock.now());
        assert_eq!(order.submitted_date().timestamp(), 0);
        assert_eq!(order.processed_date().timestamp(), 0);
        assert_eq!(order.shipping().status, ShippingStatus::None);
        assert_eq!(order.item_count(), 0);
    }

    #[test]
    fn test_add_product_merges_lines() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);

        let first = order.add_product(&a, 3).unwrap();
        let second = order.add_product(&a, 4).unwrap();

        assert_eq!(first, second);
        assert_eq!(order.item_count(), 1);
        assert_eq!(order.item(&ProductId::new("a")).unwrap().quantity(), 7);
        assert_eq!(a.lock().stock(), 10);
    }

    #[test]
    fn test_add_product_checks_combined_quantity() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);

        order.add_product(&a, 6).unwrap();
        let err = order.add_product(&a, 5).unwrap_err();

        assert!(matches!(
            err,
            CommerceError::InsufficientStock {
                requested: 11,
                available: 10,
                ..
            }
        ));
        assert_eq!(order.item(&ProductId::new("a")).unwrap().quantity(), 6);
    }

    #[test]
    fn test_add_unavailable_product_leaves_no_line() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);
        a.lock().set_status(ProductStatus::Discontinued);

        assert!(order.add_product(&a, 1).is_err());
        assert!(!order.has_product(&ProductId::new("a")));
    }

    #[test]
    fn test_edit_product() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);
        let b = product("b", 50, 10);

        assert!(matches!(
            order.edit_product(&a, 1),
            Err(CommerceError::ProductNotInOrder { .. })
        ));

        order.add_product(&a, 2).unwrap();
        order.edit_product(&a, 3).unwrap();
        assert_eq!(order.item(a.lock().id()).unwrap().quantity(), 5);

        order.edit_product(&a, -4).unwrap();
        assert_eq!(order.item(a.lock().id()).unwrap().quantity(), 1);

        assert!(order.edit_product(&a, -1).is_err());
        assert!(order.edit_product(&a, 10).is_err());
        assert_eq!(order.item(a.lock().id()).unwrap().quantity(), 1);
        assert!(!order.has_product(b.lock().id()));
    }

    #[test]
    fn test_delete_product() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);
        let id = ProductId::new("a");

        order.add_product(&a, 2).unwrap();
        assert!(order.has_product(&id));

        order.delete_product(&id).unwrap();
        assert!(!order.has_product(&id));
        assert!(matches!(
            order.delete_product(&id),
            Err(CommerceError::ProductNotInOrder { .. })
        ));
    }

    #[test]
    fn test_quote_does_not_store_amount() {
        let clock = clock();
        let mut order = draft(&clock);
        order.add_product(&product("a", 100, 10), 5).unwrap();

        assert_eq!(order.quote(None).unwrap(), Decimal::from(500));
        assert_eq!(order.amount(), Decimal::ZERO);

        assert_eq!(order.calculate_amount(None).unwrap(), Decimal::from(500));
        assert_eq!(order.amount(), Decimal::from(500));
    }

    #[test]
    fn test_quote_sums_every_line() {
        let clock = clock();
        let mut order = draft(&clock);
        order.add_product(&product("a", 100, 10), 5).unwrap();
        order.add_product(&product("b", 150, 10), 5).unwrap();
        order.add_product(&product("c", 7, 10), 3).unwrap();

        assert_eq!(order.quote(None).unwrap(), Decimal::from(1271));
    }

    #[test]
    fn test_quote_reports_amount_overflow() {
        let clock = clock();
        let mut order = draft(&clock);
        let huge = product("a", 0, 10);
        huge.lock().set_price(Decimal::MAX).unwrap();
        order.add_product(&huge, 2).unwrap();

        assert_eq!(order.quote(None), Err(CommerceError::AmountOverflow));
        assert_eq!(order.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_calculate_amount_rejects_zero_total() {
        let clock = clock();
        let mut order = draft(&clock);
        order.add_product(&product("a", 100, 10), 1).unwrap();
        order.calculate_amount(None).unwrap();

        let mut coupon = Coupon::new(CouponId::new("c-1"), &*clock);
        coupon.set_terms(CouponKind::Value, Decimal::from(100)).unwrap();

        assert!(matches!(
            order.calculate_amount(Some(&coupon)),
            Err(CommerceError::NonPositiveAmount(_))
        ));
        assert_eq!(order.amount(), Decimal::from(100));
    }

    #[test]
    fn test_submit_without_coupon() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 100);
        order.add_product(&a, 5).unwrap();
        clock.advance(Duration::minutes(5));

        order.submit("Ann", "1 Main St", None).unwrap();

        assert_eq!(order.status(), OrderStatus::Submitted);
        assert_eq!(order.amount(), Decimal::from(500));
        assert_eq!(order.submitted_date(), clock.now());
        assert_eq!(order.shipping().name, "Ann");
        assert_eq!(order.shipping().address, "1 Main St");
        assert!(order.coupon().is_none());
        assert_eq!(a.lock().stock(), 95);
    }

    #[test]
    fn test_submit_revalidates_items() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);
        let b = product("b", 100, 10);
        order.add_product(&a, 5).unwrap();
        order.add_product(&b, 5).unwrap();
        b.lock().set_stock(4).unwrap();

        let err = order.submit("Ann", "1 Main St", None).unwrap_err();

        assert!(matches!(err, CommerceError::ItemRejected { .. }));
        assert_eq!(order.status(), OrderStatus::Draft);
        assert_eq!(a.lock().stock(), 10);
        assert_eq!(b.lock().stock(), 4);
    }

    #[test]
    fn test_submit_twice_rejected() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);
        order.add_product(&a, 1).unwrap();
        order.submit("Ann", "1 Main St", None).unwrap();

        assert!(order.submit("Ann", "1 Main St", None).unwrap_err().is_state_mismatch());
        assert!(order.add_product(&a, 1).unwrap_err().is_state_mismatch());
        assert_eq!(a.lock().stock(), 9);
    }

    #[test]
    fn test_submit_with_expired_coupon() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);
        order.add_product(&a, 2).unwrap();

        let mut coupon = Coupon::new(CouponId::new("c-1"), &*clock);
        coupon.set_status(CouponStatus::Active);
        coupon.set_stock(5).unwrap();
        let coupon = Shared::new(coupon);
        clock.advance(Duration::days(100));

        let err = order.submit("Ann", "1 Main St", Some(&coupon)).unwrap_err();

        assert!(matches!(
            err.root_cause(),
            CommerceError::CouponExpired(_)
        ));
        assert_eq!(order.status(), OrderStatus::Draft);
        assert_eq!(order.amount(), Decimal::ZERO);
        assert_eq!(coupon.lock().status(), CouponStatus::Expired);
        assert_eq!(coupon.lock().stock(), 5);
        assert_eq!(a.lock().stock(), 10);
    }

    #[test]
    fn test_lifecycle_to_delivery() {
        let clock = clock();
        let mut order = draft(&clock);
        order.add_product(&product("a", 100, 10), 1).unwrap();
        order.submit("Ann", "1 Main St", None).unwrap();

        assert!(order.process_shipping("TRK-1").is_err());
        assert!(order.finish().is_err());

        clock.advance(Duration::hours(1));
        order.process().unwrap();
        assert_eq!(order.status(), OrderStatus::Processed);
        assert!(order.processed_date() > order.created_date());
        assert!(order.cancel().is_err());

        order.process_shipping("TRK-1").unwrap();
        assert_eq!(order.shipping().status, ShippingStatus::OnProcess);
        assert_eq!(order.shipping().tracking_id.as_deref(), Some("TRK-1"));
        assert!(order.process_shipping("TRK-2").is_err());
        assert_eq!(order.shipping().tracking_id.as_deref(), Some("TRK-1"));

        order.finish().unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(order.shipping().status, ShippingStatus::Delivered);
        assert!(order.status().is_terminal());
        assert!(order.finish().is_err());
    }

    #[test]
    fn test_cancel_keeps_stock_committed() {
        let clock = clock();
        let mut order = draft(&clock);
        let a = product("a", 100, 10);
        order.add_product(&a, 3).unwrap();

        assert!(order.cancel().is_err());
        order.submit("Ann", "1 Main St", None).unwrap();
        order.cancel().unwrap();

        assert_eq!(order.status(), OrderStatus::Canceled);
        assert_eq!(a.lock().stock(), 7);
        assert!(order.process().is_err());
    }

    #[rstest]
    #[case("D", OrderStatus::Draft)]
    #[case("S", OrderStatus::Submitted)]
    #[case("C", OrderStatus::Canceled)]
    #[case("P", OrderStatus::Processed)]
    #[case("DL", OrderStatus::Delivered)]
    fn test_status_codes(#[case] code: &str, #[case] status: OrderStatus) {
        assert_eq!(code.parse::<OrderStatus>().unwrap(), status);
        assert_eq!(status.code(), code);
    }

    #[test]
    fn test_summary() {
        let clock = clock();
        let mut order = draft(&clock);
        order.add_product(&product("b", 150, 10), 2).unwrap();
        order.add_product(&product("a", 100, 10), 1).unwrap();
        order.submit("Ann", "1 Main St", None).unwrap();

        let summary = order.summary();
        assert_eq!(summary.amount, Decimal::from(400));
        assert_eq!(summary.status, OrderStatus::Submitted);
        let ids: Vec<&str> = summary.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(summary.lines[1].product_name, "B");
    }
}
