//! Coupon types.

use crate::catalog::check_stock;
use crate::clock::Clock;
use crate::config::CouponDefaults;
use crate::error::CommerceError;
use crate::ids::CouponId;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Coupon lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CouponStatus {
    /// Coupon can be redeemed.
    #[serde(rename = "A")]
    Active,
    /// Coupon is not redeemable yet.
    #[default]
    #[serde(rename = "I")]
    Inactive,
    /// Validity window has passed.
    #[serde(rename = "E")]
    Expired,
    /// Coupon was withdrawn.
    #[serde(rename = "S")]
    Suspended,
}

impl CouponStatus {
    /// Short persisted code.
    pub fn code(&self) -> &'static str {
        match self {
            CouponStatus::Active => "A",
            CouponStatus::Inactive => "I",
            CouponStatus::Expired => "E",
            CouponStatus::Suspended => "S",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            CouponStatus::Active => "Active",
            CouponStatus::Inactive => "Inactive",
            CouponStatus::Expired => "Expired",
            CouponStatus::Suspended => "Suspended",
        }
    }
}

impl FromStr for CouponStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(CouponStatus::Active),
            "I" => Ok(CouponStatus::Inactive),
            "E" => Ok(CouponStatus::Expired),
            "S" => Ok(CouponStatus::Suspended),
            _ => Err(CommerceError::unknown_code("coupon status", s)),
        }
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a coupon discounts an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CouponKind {
    /// Fixed amount off the subtotal.
    #[serde(rename = "V")]
    Value,
    /// Percentage of the subtotal, strictly between 0 and 100.
    #[default]
    #[serde(rename = "P")]
    Percentage,
}

impl CouponKind {
    /// Short persisted code.
    pub fn code(&self) -> &'static str {
        match self {
            CouponKind::Value => "V",
            CouponKind::Percentage => "P",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            CouponKind::Value => "Value",
            CouponKind::Percentage => "Percentage",
        }
    }
}

impl FromStr for CouponKind {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "V" => Ok(CouponKind::Value),
            "P" => Ok(CouponKind::Percentage),
            _ => Err(CommerceError::unknown_code("coupon kind", s)),
        }
    }
}

impl fmt::Display for CouponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A discount coupon with a validity window and limited redemptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "CouponRecord")]
pub struct Coupon {
    /// Unique coupon identifier.
    id: CouponId,
    /// Lifecycle status.
    status: CouponStatus,
    /// Discount kind.
    kind: CouponKind,
    /// Discount value: an amount for `Value`, a percentage for `Percentage`.
    value: Decimal,
    /// First instant the coupon is valid.
    start_date: DateTime<Utc>,
    /// Last instant the coupon is valid.
    end_date: DateTime<Utc>,
    /// Remaining redemptions.
    stock: i64,
}

impl Coupon {
    /// Create an inactive 10% coupon valid for 90 days from today.
    pub fn new(id: CouponId, clock: &dyn Clock) -> Self {
        let defaults = CouponDefaults::default();
        let start_date = clock.today();
        Self {
            id,
            status: defaults.status,
            kind: defaults.kind,
            value: defaults.value,
            start_date,
            end_date: start_date + Duration::days(defaults.validity_days),
            stock: defaults.stock,
        }
    }

    /// Create a coupon from configured defaults.
    pub fn with_defaults(
        id: CouponId,
        defaults: &CouponDefaults,
        clock: &dyn Clock,
    ) -> Result<Self, CommerceError> {
        check_terms(defaults.kind, defaults.value)?;
        check_stock(defaults.stock)?;
        let start_date = clock.today();
        let end_date = start_date + Duration::days(defaults.validity_days);
        check_window(start_date, end_date)?;

        Ok(Self {
            id,
            status: defaults.status,
            kind: defaults.kind,
            value: defaults.value,
            start_date,
            end_date,
            stock: defaults.stock,
        })
    }

    pub fn id(&self) -> &CouponId {
        &self.id
    }

    pub fn status(&self) -> CouponStatus {
        self.status
    }

    pub fn kind(&self) -> CouponKind {
        self.kind
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn set_status(&mut self, status: CouponStatus) {
        self.status = status;
    }

    /// Set the remaining redemptions. Negative stock is rejected.
    pub fn set_stock(&mut self, stock: i64) -> Result<(), CommerceError> {
        check_stock(stock)?;
        self.stock = stock;
        Ok(())
    }

    /// Change the discount kind, keeping the current value valid for it.
    pub fn set_kind(&mut self, kind: CouponKind) -> Result<(), CommerceError> {
        check_terms(kind, self.value)?;
        self.kind = kind;
        Ok(())
    }

    /// Change the discount value, validated against the current kind.
    pub fn set_value(&mut self, value: Decimal) -> Result<(), CommerceError> {
        check_terms(self.kind, value)?;
        self.value = value;
        Ok(())
    }

    /// Change kind and value together.
    pub fn set_terms(&mut self, kind: CouponKind, value: Decimal) -> Result<(), CommerceError> {
        check_terms(kind, value)?;
        self.kind = kind;
        self.value = value;
        Ok(())
    }

    pub fn set_start_date(&mut self, start_date: DateTime<Utc>) -> Result<(), CommerceError> {
        check_window(start_date, self.end_date)?;
        self.start_date = start_date;
        Ok(())
    }

    pub fn set_end_date(&mut self, end_date: DateTime<Utc>) -> Result<(), CommerceError> {
        check_window(self.start_date, end_date)?;
        self.end_date = end_date;
        Ok(())
    }

    /// Replace the whole validity window.
    pub fn set_validity(
        &mut self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<(), CommerceError> {
        check_window(start_date, end_date)?;
        self.start_date = start_date;
        self.end_date = end_date;
        Ok(())
    }

    /// Check whether the window has not opened yet. Marks the coupon inactive if so.
    pub fn is_early(&mut self, now: DateTime<Utc>) -> bool {
        if self.start_date <= now {
            return false;
        }
        if self.status != CouponStatus::Inactive {
            warn!(coupon_id = %self.id, from = self.status.code(), "coupon not started, marking inactive");
        }
        self.status = CouponStatus::Inactive;
        true
    }

    /// Check whether the window has closed. Marks the coupon expired if so.
    pub fn is_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.end_date >= now {
            return false;
        }
        if self.status != CouponStatus::Expired {
            warn!(coupon_id = %self.id, from = self.status.code(), "coupon window closed, marking expired");
        }
        self.status = CouponStatus::Expired;
        true
    }

    /// Check whether the coupon can be redeemed at `now`.
    ///
    /// Checks run in order: status, window start, window end, stock. The window
    /// checks only run for active coupons, and may change the status.
    pub fn can_be_applied(&mut self, now: DateTime<Utc>) -> Result<(), CommerceError> {
        if self.status != CouponStatus::Active {
            return Err(CommerceError::CouponInactive {
                coupon_id: self.id.to_string(),
                status: self.status.label(),
            });
        }
        if self.is_early(now) {
            return Err(CommerceError::CouponNotStarted(self.id.to_string()));
        }
        if self.is_expired(now) {
            return Err(CommerceError::CouponExpired(self.id.to_string()));
        }
        if self.stock <= 0 {
            return Err(CommerceError::CouponOutOfStock(self.id.to_string()));
        }
        Ok(())
    }

    /// Discount granted on `amount`.
    ///
    /// Value coupons return their value regardless of `amount`; the caller
    /// rejects totals that drop to zero or below.
    pub fn discount_for(&self, amount: Decimal) -> Result<Decimal, CommerceError> {
        match self.kind {
            CouponKind::Percentage => amount
                .checked_mul(self.value)
                .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                .ok_or(CommerceError::AmountOverflow),
            CouponKind::Value => Ok(self.value),
        }
    }

    /// Consume one redemption.
    pub(crate) fn redeem(&mut self) {
        self.stock -= 1;
    }
}

/// Coupon fields as stored, before validation.
#[derive(Deserialize)]
struct CouponRecord {
    id: CouponId,
    status: CouponStatus,
    kind: CouponKind,
    value: Decimal,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    stock: i64,
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = CommerceError;

    fn try_from(record: CouponRecord) -> Result<Self, Self::Error> {
        check_terms(record.kind, record.value)?;
        check_window(record.start_date, record.end_date)?;
        check_stock(record.stock)?;

        Ok(Self {
            id: record.id,
            status: record.status,
            kind: record.kind,
            value: record.value,
            start_date: record.start_date,
            end_date: record.end_date,
            stock: record.stock,
        })
    }
}

fn check_terms(kind: CouponKind, value: Decimal) -> Result<(), CommerceError> {
    if value <= Decimal::ZERO {
        return Err(CommerceError::NonPositiveCouponValue(value.to_string()));
    }
    if kind == CouponKind::Percentage && value >= Decimal::ONE_HUNDRED {
        return Err(CommerceError::PercentageOutOfRange(value.to_string()));
    }
    Ok(())
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), CommerceError> {
    if start > end {
        return Err(CommerceError::InvalidValidityWindow {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }
    Ok(())
}
