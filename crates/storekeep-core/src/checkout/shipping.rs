//! Shipping details attached to an order.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShippingStatus {
    /// Nothing shipped yet.
    #[default]
    #[serde(rename = "N")]
    None,
    /// Handed to the carrier.
    #[serde(rename = "O")]
    OnProcess,
    /// Received by the customer.
    #[serde(rename = "D")]
    Delivered,
}

impl ShippingStatus {
    /// Short persisted code.
    pub fn code(&self) -> &'static str {
        match self {
            ShippingStatus::None => "N",
            ShippingStatus::OnProcess => "O",
            ShippingStatus::Delivered => "D",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            ShippingStatus::None => "None",
            ShippingStatus::OnProcess => "On Process",
            ShippingStatus::Delivered => "Delivered",
        }
    }
}

impl FromStr for ShippingStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(ShippingStatus::None),
            "O" => Ok(ShippingStatus::OnProcess),
            "D" => Ok(ShippingStatus::Delivered),
            _ => Err(CommerceError::unknown_code("shipping status", s)),
        }
    }
}

impl fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where an order goes and how far it got.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    /// Recipient name.
    pub name: String,
    /// Delivery address.
    pub address: String,
    /// Delivery progress.
    pub status: ShippingStatus,
    /// Carrier tracking number, set once the parcel is handed over.
    pub tracking_id: Option<String>,
}
