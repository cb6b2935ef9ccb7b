//! Coupon rules and evaluation
//!
//! The `CouponBook` owns the rule table and its usage counters. Evaluation
//! never touches cart state; the cart decides what to do with the returned
//! `AppliedCoupon` or rejection.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::value_objects::Money;

/// Discount shape of a coupon rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CouponKind {
    /// Percentage off the cart subtotal.
    Percentage(Decimal),
    /// Fixed amount off, capped at the subtotal.
    FixedAmount(Decimal),
    /// Waives the shipping cost instead of discounting the subtotal.
    FreeShipping,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CouponRule {
    code: String,
    kind: CouponKind,
    min_purchase: Money,
    max_uses: Option<u32>,
    uses: u32,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
}

impl CouponRule {
    pub fn new(code: impl Into<String>, kind: CouponKind) -> Self {
        Self {
            code: code.into().trim().to_uppercase(),
            kind,
            min_purchase: Money::default(),
            max_uses: None,
            uses: 0,
            valid_from: None,
            valid_until: None,
        }
    }

    pub fn percentage(code: impl Into<String>, rate: Decimal) -> Self {
        Self::new(code, CouponKind::Percentage(rate))
    }

    pub fn fixed(code: impl Into<String>, amount: Decimal) -> Self {
        Self::new(code, CouponKind::FixedAmount(amount))
    }

    pub fn free_shipping(code: impl Into<String>) -> Self {
        Self::new(code, CouponKind::FreeShipping)
    }

    pub fn with_min_purchase(mut self, min: Money) -> Self {
        self.min_purchase = min;
        self
    }

    pub fn with_usage_cap(mut self, cap: u32) -> Self {
        self.max_uses = Some(cap);
        self
    }

    pub fn with_window(mut self, from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.valid_from = from;
        self.valid_until = until;
        self
    }

    pub fn code(&self) -> &str { &self.code }
    pub fn kind(&self) -> &CouponKind { &self.kind }
    pub fn uses(&self) -> u32 { self.uses }
}

/// Discount descriptor the cart carries once a code is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub kind: CouponKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("coupon code not found")]
    NotFound,
    #[error("cart subtotal is below the coupon minimum of {required}")]
    BelowMinimum { required: String },
    #[error("coupon is not yet active")]
    NotYetActive,
    #[error("coupon has expired")]
    Expired,
    #[error("coupon usage limit reached")]
    UsageExhausted,
}

/// Mutable rule table keyed by uppercased code.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CouponBook {
    rules: HashMap<String, CouponRule>,
}

impl CouponBook {
    pub fn new() -> Self { Self::default() }

    pub fn with_rules(rules: impl IntoIterator<Item = CouponRule>) -> Self {
        let mut book = Self::new();
        for rule in rules {
            book.insert(rule);
        }
        book
    }

    /// The reference rule table shipped with the storefront.
    pub fn reference() -> Self {
        Self::with_rules([
            CouponRule::percentage("WELCOME10", Decimal::new(10, 0)),
            CouponRule::free_shipping("FREESHIP")
                .with_min_purchase(Money::ngn(Decimal::new(20000, 0))),
            CouponRule::fixed("NEWCUSTOMER", Decimal::new(5000, 0))
                .with_min_purchase(Money::ngn(Decimal::new(25000, 0)))
                .with_usage_cap(500),
            CouponRule::percentage("LUXURY20", Decimal::new(20, 0))
                .with_min_purchase(Money::ngn(Decimal::new(100000, 0))),
        ])
    }

    pub fn insert(&mut self, rule: CouponRule) {
        self.rules.insert(rule.code.clone(), rule);
    }

    pub fn rule(&self, code: &str) -> Option<&CouponRule> {
        self.rules.get(&code.trim().to_uppercase())
    }

    /// Validates a code against the table and, on success, increments its
    /// usage counter (when capped) and returns the applied descriptor.
    ///
    /// Rejections leave the table untouched.
    pub fn evaluate(
        &mut self,
        code: &str,
        subtotal: &Money,
        now: DateTime<Utc>,
    ) -> Result<AppliedCoupon, CouponError> {
        let key = code.trim().to_uppercase();
        let rule = self.rules.get_mut(&key).ok_or(CouponError::NotFound)?;

        if subtotal.amount() < rule.min_purchase.amount() {
            return Err(CouponError::BelowMinimum { required: rule.min_purchase.to_string() });
        }
        if let Some(from) = rule.valid_from {
            if now < from {
                return Err(CouponError::NotYetActive);
            }
        }
        if let Some(until) = rule.valid_until {
            if now > until {
                return Err(CouponError::Expired);
            }
        }
        if let Some(cap) = rule.max_uses {
            if rule.uses >= cap {
                return Err(CouponError::UsageExhausted);
            }
            rule.uses += 1;
        }

        Ok(AppliedCoupon { code: rule.code.clone(), kind: rule.kind.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn subtotal(n: i64) -> Money { Money::ngn(Decimal::new(n, 0)) }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut book = CouponBook::reference();
        let applied = book.evaluate("welcome10", &subtotal(45000), Utc::now()).unwrap();
        assert_eq!(applied.code, "WELCOME10");
        assert_eq!(applied.kind, CouponKind::Percentage(Decimal::new(10, 0)));
    }

    #[test]
    fn test_unknown_code_rejected() {
        let mut book = CouponBook::reference();
        assert_eq!(book.evaluate("INVALID", &subtotal(45000), Utc::now()), Err(CouponError::NotFound));
    }

    #[test]
    fn test_below_minimum_rejected() {
        let mut book = CouponBook::reference();
        let err = book.evaluate("LUXURY20", &subtotal(45000), Utc::now()).unwrap_err();
        assert!(matches!(err, CouponError::BelowMinimum { .. }));
    }

    #[test]
    fn test_active_window() {
        let now = Utc::now();
        let mut book = CouponBook::with_rules([
            CouponRule::percentage("SOON", Decimal::new(5, 0))
                .with_window(Some(now + Duration::days(1)), None),
            CouponRule::percentage("GONE", Decimal::new(5, 0))
                .with_window(None, Some(now - Duration::days(1))),
        ]);
        assert_eq!(book.evaluate("SOON", &subtotal(10000), now), Err(CouponError::NotYetActive));
        assert_eq!(book.evaluate("GONE", &subtotal(10000), now), Err(CouponError::Expired));
    }

    #[test]
    fn test_usage_cap_exhausts() {
        let mut book = CouponBook::with_rules([
            CouponRule::fixed("ONCE", Decimal::new(1000, 0)).with_usage_cap(1),
        ]);
        assert!(book.evaluate("ONCE", &subtotal(10000), Utc::now()).is_ok());
        assert_eq!(book.evaluate("ONCE", &subtotal(10000), Utc::now()), Err(CouponError::UsageExhausted));
    }

    #[test]
    fn test_rejection_does_not_consume_usage() {
        let mut book = CouponBook::with_rules([
            CouponRule::fixed("CAPPED", Decimal::new(1000, 0))
                .with_min_purchase(subtotal(50000))
                .with_usage_cap(2),
        ]);
        let _ = book.evaluate("CAPPED", &subtotal(100), Utc::now());
        assert_eq!(book.rule("CAPPED").unwrap().uses(), 0);
    }
}
