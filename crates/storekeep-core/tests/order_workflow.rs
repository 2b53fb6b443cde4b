//! End-to-end order submission scenarios.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use storekeep_core::prelude::*;

struct Store {
    clock: Arc<FixedClock>,
    product_a: Shared<Product>,
    product_b: Shared<Product>,
}

impl Store {
    fn order(&self) -> Order {
        let mut order = Order::new(OrderId::generate(), self.clock.clone());
        order.add_product(&self.product_a, 5).unwrap();
        order.add_product(&self.product_b, 5).unwrap();
        order
    }

    fn coupon(&self, kind: CouponKind, value: i64, stock: i64) -> Shared<Coupon> {
        let mut coupon = Coupon::new(CouponId::generate(), &*self.clock);
        coupon.set_terms(kind, Decimal::from(value)).unwrap();
        coupon.set_status(CouponStatus::Active);
        coupon.set_stock(stock).unwrap();
        Shared::new(coupon)
    }

    fn stocks(&self) -> (i64, i64) {
        (self.product_a.lock().stock(), self.product_b.lock().stock())
    }
}

fn available(id: &str, price: i64, stock: i64) -> Shared<Product> {
    let mut product = Product::new(ProductId::new(id), format!("Product {id}"));
    product.set_status(ProductStatus::Available);
    product.set_price(Decimal::from(price)).unwrap();
    product.set_stock(stock).unwrap();
    Shared::new(product)
}

#[fixture]
fn store() -> Store {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
    ));
    Store {
        clock,
        product_a: available("product-a", 100, 100),
        product_b: available("product-b", 150, 50),
    }
}

#[rstest]
#[case::value_coupon(CouponKind::Value, 100, 100, 1150)]
#[case::percentage_coupon(CouponKind::Percentage, 20, 10, 1000)]
fn submit_with_coupon(
    store: Store,
    #[case] kind: CouponKind,
    #[case] value: i64,
    #[case] coupon_stock: i64,
    #[case] expected: i64,
) {
    let mut order = store.order();
    let coupon = store.coupon(kind, value, coupon_stock);

    order.submit("Ann", "1 Main St", Some(&coupon)).unwrap();

    assert_eq!(order.status(), OrderStatus::Submitted);
    assert_eq!(order.amount(), Decimal::from(expected));
    assert_eq!(coupon.lock().stock(), coupon_stock - 1);
    assert!(order.coupon().unwrap().ptr_eq(&coupon));
    assert_eq!(store.stocks(), (95, 45));
}

#[rstest]
fn submit_without_coupon(store: Store) {
    let mut order = store.order();

    order.submit("Ann", "1 Main St", None).unwrap();

    assert_eq!(order.amount(), Decimal::from(1250));
    assert_eq!(order.shipping().status, ShippingStatus::None);
    assert_eq!(store.stocks(), (95, 45));
}

#[rstest]
fn submit_with_inactive_coupon_changes_nothing(store: Store) {
    let mut order = store.order();
    let coupon = store.coupon(CouponKind::Value, 100, 100);
    coupon.lock().set_status(CouponStatus::Inactive);

    let err = order.submit("Ann", "1 Main St", Some(&coupon)).unwrap_err();

    assert!(matches!(
        err.root_cause(),
        CommerceError::CouponInactive { .. }
    ));
    assert_eq!(order.status(), OrderStatus::Draft);
    assert_eq!(order.amount(), Decimal::ZERO);
    assert!(order.coupon().is_none());
    assert_eq!(coupon.lock().stock(), 100);
    assert_eq!(store.stocks(), (100, 50));
}

#[rstest]
fn submit_with_coupon_covering_whole_order(store: Store) {
    let mut order = store.order();
    let coupon = store.coupon(CouponKind::Value, 1250, 1);

    let err = order.submit("Ann", "1 Main St", Some(&coupon)).unwrap_err();

    assert!(matches!(
        err.root_cause(),
        CommerceError::NonPositiveAmount(_)
    ));
    assert_eq!(coupon.lock().stock(), 1);
    assert_eq!(store.stocks(), (100, 50));
}

#[rstest]
#[case::no_coupon(false)]
#[case::with_coupon(true)]
fn submit_empty_order_fails(store: Store, #[case] with_coupon: bool) {
    let mut order = Order::new(OrderId::generate(), store.clock.clone());
    let coupon = store.coupon(CouponKind::Value, 100, 100);

    let err = order
        .submit("Ann", "1 Main St", with_coupon.then_some(&coupon))
        .unwrap_err();

    assert!(matches!(err, CommerceError::EmptyOrder(_)));
    assert_eq!(order.status(), OrderStatus::Draft);
    assert_eq!(coupon.lock().stock(), 100);
}

#[rstest]
fn process_requires_submission(store: Store) {
    let mut order = store.order();

    assert!(order.process().unwrap_err().is_state_mismatch());

    order.submit("Ann", "1 Main St", None).unwrap();
    store.clock.advance(Duration::minutes(10));
    order.process().unwrap();

    assert_eq!(order.status(), OrderStatus::Processed);
    assert!(order.processed_date() > order.created_date());
}

#[rstest]
fn submit_fails_when_product_discontinued_after_adding(store: Store) {
    let mut order = store.order();
    store
        .product_b
        .lock()
        .set_status(ProductStatus::Discontinued);

    let err = order.submit("Ann", "1 Main St", None).unwrap_err();

    assert!(matches!(
        err.root_cause(),
        CommerceError::ProductUnavailable { .. }
    ));
    assert_eq!(store.stocks(), (100, 50));
}

#[test]
fn concurrent_submissions_never_oversell() {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scarce = available("scarce", 10, 5);
    let plenty = available("plenty", 10, 1_000);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let clock = clock.clone();
            let scarce = scarce.clone();
            let plenty = plenty.clone();
            thread::spawn(move || {
                let mut order = Order::new(OrderId::generate(), clock);
                order.add_product(&plenty, 1).ok()?;
                order.add_product(&scarce, 2).ok()?;
                order.submit("Ann", "1 Main St", None).ok()
            })
        })
        .collect();

    let submitted = handles
        .into_iter()
        .filter_map(|handle| handle.join().unwrap())
        .count() as i64;

    assert_eq!(submitted, 2);
    assert_eq!(scarce.lock().stock(), 5 - 2 * submitted);
    assert_eq!(plenty.lock().stock(), 1_000 - submitted);
}

proptest! {
    #[test]
    fn submit_is_all_or_nothing(
        stock_a in 0i64..10,
        stock_b in 0i64..10,
        coupon_value in 1i64..2_000,
        coupon_active in any::<bool>(),
    ) {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        let a = available("a", 100, 10);
        let b = available("b", 150, 10);
        let mut order = Order::new(OrderId::new("o"), clock.clone());
        order.add_product(&a, 5).unwrap();
        order.add_product(&b, 5).unwrap();
        a.lock().set_stock(stock_a).unwrap();
        b.lock().set_stock(stock_b).unwrap();

        let mut coupon = Coupon::new(CouponId::new("c"), &*clock);
        coupon.set_terms(CouponKind::Value, Decimal::from(coupon_value)).unwrap();
        coupon.set_stock(3).unwrap();
        if coupon_active {
            coupon.set_status(CouponStatus::Active);
        }
        let coupon = Shared::new(coupon);

        let result = order.submit("Ann", "1 Main St", Some(&coupon));
        let should_pass = stock_a >= 5 && stock_b >= 5 && coupon_active && coupon_value < 1250;

        prop_assert_eq!(result.is_ok(), should_pass);
        if should_pass {
            prop_assert_eq!(order.status(), OrderStatus::Submitted);
            prop_assert_eq!(order.amount(), Decimal::from(1250 - coupon_value));
            prop_assert_eq!(a.lock().stock(), stock_a - 5);
            prop_assert_eq!(b.lock().stock(), stock_b - 5);
            prop_assert_eq!(coupon.lock().stock(), 2);
        } else {
            prop_assert_eq!(order.status(), OrderStatus::Draft);
            prop_assert_eq!(order.amount(), Decimal::ZERO);
            prop_assert_eq!(a.lock().stock(), stock_a);
            prop_assert_eq!(b.lock().stock(), stock_b);
            prop_assert_eq!(coupon.lock().stock(), 3);
        }
    }

    #[test]
    fn add_product_merges_into_one_line(quantities in proptest::collection::vec(1i64..5, 1..10)) {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let product = available("p", 10, 1_000);
        let mut order = Order::new(OrderId::new("o"), clock);

        for quantity in &quantities {
            order.add_product(&product, *quantity).unwrap();
        }

        prop_assert_eq!(order.item_count(), 1);
        prop_assert!(order.has_product(&ProductId::new("p")));
        prop_assert!(!order.has_product(&ProductId::new("q")));
        prop_assert_eq!(
            order.item(&ProductId::new("p")).unwrap().quantity(),
            quantities.iter().sum::<i64>()
        );
    }
}
