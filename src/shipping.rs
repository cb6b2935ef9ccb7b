//! Shipping methods
//!
//! The storefront offers a small fixed catalog; the cart only needs the
//! price, the checkout screens also show the transit estimate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: String,
    pub name: String,
    pub price: Money,
    /// Estimated transit days (min).
    pub min_days: u32,
    /// Estimated transit days (max).
    pub max_days: u32,
}

impl ShippingMethod {
    fn new(id: &str, name: &str, price: i64, min_days: u32, max_days: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price: Money::ngn(Decimal::new(price, 0)),
            min_days,
            max_days,
        }
    }

    pub fn standard() -> Self { Self::new("standard", "Standard Delivery", 2500, 3, 5) }
    pub fn express() -> Self { Self::new("express", "Express Delivery", 5000, 1, 2) }
    pub fn next_day() -> Self { Self::new("next-day", "Next-Day Delivery", 8000, 1, 1) }
    pub fn interstate() -> Self { Self::new("interstate", "Interstate Delivery", 3500, 5, 10) }

    /// The full fixed catalog, in display order.
    pub fn catalog() -> Vec<ShippingMethod> {
        vec![Self::standard(), Self::express(), Self::next_day(), Self::interstate()]
    }

    pub fn by_id(id: &str) -> Option<ShippingMethod> {
        Self::catalog().into_iter().find(|m| m.id == id)
    }

    /// Estimated delivery range string.
    pub fn delivery_estimate(&self) -> String {
        if self.min_days == self.max_days {
            format!("{} business day(s)", self.min_days)
        } else {
            format!("{}-{} business days", self.min_days, self.max_days)
        }
    }
}
