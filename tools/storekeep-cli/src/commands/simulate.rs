//! Run an order scenario end to end.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use storekeep_auth::{PasswordHasher, User, UserStatus};
use storekeep_core::prelude::*;
use tracing::info;

use super::SimulateArgs;
use crate::context::Context;
use crate::output::status_badge;
use crate::scenario::{Scenario, ScenarioCoupon, ScenarioProduct, ScenarioUser, Step};

/// Run the simulate command.
pub fn run(args: SimulateArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.scenario);
    let mut scenario = Scenario::load(&path)?;
    if let Some(steps) = args.steps {
        scenario.order.steps = steps;
    }
    ctx.output.debug(&format!("Loaded scenario: {}", path.display()));

    let clock: Arc<dyn Clock> = match scenario.now {
        Some(now) => Arc::new(FixedClock::new(now)),
        None => Arc::new(SystemClock),
    };
    let hasher =
        PasswordHasher::new(ctx.config.password.clone()).context("Invalid password policy")?;

    let user = build_user(&scenario.user, &hasher)?;
    let products = build_products(&scenario.products)?;
    let coupons = build_coupons(&scenario.coupons, &ctx.config.coupon, &*clock)?;

    let mut order = Order::new(OrderId::generate(), clock);
    info!(
        order_id = %order.id(),
        products = products.len(),
        coupons = coupons.len(),
        steps = scenario.order.steps.len(),
        "running scenario"
    );
    let outcome = drive(&scenario, &user, &products, &coupons, &mut order, ctx);

    let report = Report::new(&user, &order, &products, &coupons, outcome.as_ref().err());
    if ctx.output.is_json() {
        ctx.output.json(&report);
    } else {
        print_report(&report, ctx);
    }

    outcome
}

fn build_user(spec: &ScenarioUser, hasher: &PasswordHasher) -> Result<User> {
    let mut user = User::new(UserId::generate(), &spec.name, &spec.address, hasher)?;
    if let Some(password) = &spec.password {
        user.set_password(password, hasher)?;
    }
    user.set_status(spec.status);
    Ok(user)
}

fn build_products(specs: &[ScenarioProduct]) -> Result<BTreeMap<String, Shared<Product>>> {
    let mut products = BTreeMap::new();
    for spec in specs {
        let mut product = Product::new(ProductId::new(&spec.id), &spec.name);
        let context = || format!("Invalid product {}", spec.id);
        product.set_price(spec.price).with_context(context)?;
        product.set_stock(spec.stock).with_context(context)?;
        product.set_status(spec.status);

        if products.insert(spec.id.clone(), Shared::new(product)).is_some() {
            bail!("Duplicate product id: {}", spec.id);
        }
    }
    Ok(products)
}

fn build_coupons(
    specs: &[ScenarioCoupon],
    defaults: &CouponDefaults,
    clock: &dyn Clock,
) -> Result<BTreeMap<String, Shared<Coupon>>> {
    let mut coupons = BTreeMap::new();
    for spec in specs {
        let context = || format!("Invalid coupon {}", spec.id);
        let mut coupon = Coupon::with_defaults(CouponId::new(&spec.id), defaults, clock)
            .with_context(context)?;

        if spec.kind.is_some() || spec.value.is_some() {
            let kind = spec.kind.unwrap_or(coupon.kind());
            let value = spec.value.unwrap_or(coupon.value());
            coupon.set_terms(kind, value).with_context(context)?;
        }
        if spec.valid_from.is_some() || spec.valid_until.is_some() {
            let start = spec.valid_from.unwrap_or(coupon.start_date());
            let end = spec.valid_until.unwrap_or(coupon.end_date());
            coupon.set_validity(start, end).with_context(context)?;
        }
        if let Some(status) = spec.status {
            coupon.set_status(status);
        }
        if let Some(stock) = spec.stock {
            coupon.set_stock(stock).with_context(context)?;
        }

        if coupons.insert(spec.id.clone(), Shared::new(coupon)).is_some() {
            bail!("Duplicate coupon id: {}", spec.id);
        }
    }
    Ok(coupons)
}

fn drive(
    scenario: &Scenario,
    user: &User,
    products: &BTreeMap<String, Shared<Product>>,
    coupons: &BTreeMap<String, Shared<Coupon>>,
    order: &mut Order,
    ctx: &Context,
) -> Result<()> {
    user.can_order()?;

    for line in &scenario.order.lines {
        let product = products
            .get(&line.product)
            .with_context(|| format!("Unknown product in order: {}", line.product))?;
        order
            .add_product(product, line.quantity)
            .with_context(|| format!("Cannot add {} x {}", line.quantity, line.product))?;
        ctx.output
            .debug(&format!("Added {} x {}", line.quantity, line.product));
    }

    let coupon = match &scenario.order.coupon {
        Some(id) => Some(
            coupons
                .get(id)
                .with_context(|| format!("Unknown coupon: {}", id))?,
        ),
        None => None,
    };

    let tracking_id = scenario
        .order
        .tracking_id
        .clone()
        .unwrap_or_else(|| format!("TRK-{}", order.id()));

    let total = scenario.order.steps.len();
    for (i, step) in scenario.order.steps.iter().enumerate() {
        ctx.output.step(i + 1, total, step.as_str());
        let result = match step {
            Step::Submit => order.submit(
                scenario
                    .order
                    .shipping_name
                    .as_deref()
                    .unwrap_or(user.name()),
                scenario
                    .order
                    .shipping_address
                    .as_deref()
                    .unwrap_or(user.address()),
                coupon,
            ),
            Step::Process => order.process(),
            Step::Ship => order.process_shipping(tracking_id.as_str()),
            Step::Finish => order.finish(),
            Step::Cancel => order.cancel(),
        };
        result.with_context(|| format!("Step `{}` failed", step.as_str()))?;
    }

    Ok(())
}

/// Final state of everything the scenario touched.
#[derive(Debug, Serialize)]
struct Report {
    user: UserReport,
    order: OrderSummary,
    products: Vec<ProductReport>,
    coupons: Vec<CouponReport>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserReport {
    id: UserId,
    name: String,
    status: UserStatus,
}

#[derive(Debug, Serialize)]
struct ProductReport {
    id: ProductId,
    name: String,
    status: ProductStatus,
    price: Decimal,
    stock: i64,
}

#[derive(Debug, Serialize)]
struct CouponReport {
    id: CouponId,
    status: CouponStatus,
    kind: CouponKind,
    value: Decimal,
    stock: i64,
}

impl Report {
    fn new(
        user: &User,
        order: &Order,
        products: &BTreeMap<String, Shared<Product>>,
        coupons: &BTreeMap<String, Shared<Coupon>>,
        error: Option<&anyhow::Error>,
    ) -> Self {
        Self {
            user: UserReport {
                id: user.id().clone(),
                name: user.name().to_string(),
                status: user.status(),
            },
            order: order.summary(),
            products: products
                .values()
                .map(|handle| {
                    let product = handle.lock();
                    ProductReport {
                        id: product.id().clone(),
                        name: product.name().to_string(),
                        status: product.status(),
                        price: product.price(),
                        stock: product.stock(),
                    }
                })
                .collect(),
            coupons: coupons
                .values()
                .map(|handle| {
                    let coupon = handle.lock();
                    CouponReport {
                        id: coupon.id().clone(),
                        status: coupon.status(),
                        kind: coupon.kind(),
                        value: coupon.value(),
                        stock: coupon.stock(),
                    }
                })
                .collect(),
            error: error.map(|e| format!("{:#}", e)),
        }
    }
}

fn print_report(report: &Report, ctx: &Context) {
    let order = &report.order;
    let out = &ctx.output;

    out.header(&format!("Order {}", order.id));
    out.kv("customer", &format!("{} ({})", report.user.name, report.user.status));
    out.kv("status", &status_badge(order.status.label()));
    out.kv("amount", &order.amount.to_string());
    out.kv("created", &order.created_date.to_rfc3339());
    if order.status != OrderStatus::Draft {
        out.kv("submitted", &order.submitted_date.to_rfc3339());
    }
    if let Some(coupon) = &order.coupon_id {
        out.kv("coupon", coupon.as_str());
    }
    out.kv("shipping", &status_badge(order.shipping.status.label()));
    if !order.shipping.name.is_empty() {
        out.kv(
            "ship to",
            &format!("{}, {}", order.shipping.name, order.shipping.address),
        );
    }
    if let Some(tracking) = &order.shipping.tracking_id {
        out.kv("tracking", tracking);
    }

    out.header("Lines");
    let widths = [20, 24, 10, 8];
    out.table_row(&["PRODUCT", "NAME", "PRICE", "QTY"], &widths);
    for line in &order.lines {
        let price = line.unit_price.to_string();
        let quantity = line.quantity.to_string();
        out.table_row(
            &[
                line.product_id.as_str(),
                line.product_name.as_str(),
                price.as_str(),
                quantity.as_str(),
            ],
            &widths,
        );
    }

    out.header("Stock");
    for product in &report.products {
        out.kv(
            product.id.as_str(),
            &format!("{} left ({})", product.stock, status_badge(product.status.label())),
        );
    }
    for coupon in &report.coupons {
        out.kv(
            coupon.id.as_str(),
            &format!(
                "{} redemptions left ({})",
                coupon.stock,
                status_badge(coupon.status.label())
            ),
        );
    }

    match &report.error {
        Some(error) => out.warn(&format!("Scenario stopped: {}", error)),
        None => out.success("Scenario completed"),
    }
}
