//! Scenario files for `storekeep simulate`.
//!
//! A scenario lists the catalog, coupons and customer to set up, the lines of
//! one order, and the lifecycle steps to drive that order through.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storekeep_auth::UserStatus;
use storekeep_core::catalog::ProductStatus;
use storekeep_core::promotion::{CouponKind, CouponStatus};

/// A complete simulation input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    /// Pin the clock to this instant; wall-clock time when absent.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,

    /// The ordering customer.
    pub user: ScenarioUser,

    /// Catalog to create.
    #[serde(default)]
    pub products: Vec<ScenarioProduct>,

    /// Coupons to create.
    #[serde(default)]
    pub coupons: Vec<ScenarioCoupon>,

    /// The order to place.
    pub order: ScenarioOrder,
}

impl Scenario {
    /// Load a scenario, choosing TOML or JSON from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON scenario: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML scenario: {}", path.display()))
        }
    }
}

/// Customer account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioUser {
    pub name: String,
    pub address: String,
    #[serde(default = "active_user")]
    pub status: UserStatus,
    /// Replaces the default password when set.
    #[serde(default)]
    pub password: Option<String>,
}

fn active_user() -> UserStatus {
    UserStatus::Active
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioProduct {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    #[serde(default = "available_product")]
    pub status: ProductStatus,
}

fn available_product() -> ProductStatus {
    ProductStatus::Available
}

/// Coupon overrides applied on top of the configured defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioCoupon {
    pub id: String,
    #[serde(default)]
    pub kind: Option<CouponKind>,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub status: Option<CouponStatus>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

/// The order and what to do with it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioOrder {
    pub lines: Vec<ScenarioLine>,
    /// Coupon id to redeem at submission.
    #[serde(default)]
    pub coupon: Option<String>,
    /// Defaults to the user's name.
    #[serde(default)]
    pub shipping_name: Option<String>,
    /// Defaults to the user's address.
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default = "default_steps")]
    pub steps: Vec<Step>,
}

/// One `add_product` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioLine {
    pub product: String,
    pub quantity: i64,
}

/// Lifecycle action applied to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Submit,
    Process,
    Ship,
    Finish,
    Cancel,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Submit => "submit",
            Step::Process => "process",
            Step::Ship => "ship",
            Step::Finish => "finish",
            Step::Cancel => "cancel",
        }
    }
}

fn default_steps() -> Vec<Step> {
    vec![Step::Submit]
}
