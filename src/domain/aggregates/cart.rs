//! Cart aggregate and totals engine
//!
//! Every mutation is applied atomically and immediately followed by a
//! recomputation of the totals, so callers never observe a cart whose
//! derived figures disagree with its line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::domain::aggregates::coupon::{AppliedCoupon, CouponBook, CouponError, CouponKind};
use crate::domain::aggregates::product::{PreorderInfo, Product, StockError};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::Money;
use crate::shipping::ShippingMethod;

/// One (product, colour, size) entry in the cart.
///
/// Identity is the (product_id, color, size) triple; two entries differing
/// only in quantity are the same line item and merge on add.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub unit_price: Money,
    /// Pre-sale price, kept for strike-through display.
    pub original_price: Option<Money>,
    pub quantity: u32,
    /// Stock-derived ceiling, already capped by the product's hard limit.
    pub max_quantity: u32,
    pub in_stock: bool,
    pub preorder: Option<PreorderInfo>,
}

impl LineItem {
    fn from_product(product: &Product, color: Option<&str>, size: Option<&str>, quantity: u32) -> Self {
        let info = product.resolve_stock(color, size);
        let max_quantity = info.stock.min(product.max_quantity);
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            color: color.map(str::to_string),
            size: size.map(str::to_string),
            unit_price: info.unit_price,
            original_price: product.sale_price.as_ref().map(|_| product.price.clone()),
            quantity: quantity.min(max_quantity).max(1),
            max_quantity,
            in_stock: info.stock > 0,
            preorder: product.preorder.clone(),
        }
    }

    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }

    fn matches(&self, product_id: &str, color: Option<&str>, size: Option<&str>) -> bool {
        self.product_id == product_id
            && self.color.as_deref() == color
            && self.size.as_deref() == size
    }
}

/// Cart price totals.
///
/// Always a pure function of (line items, applied coupon, shipping method,
/// pricing parameters); the copy a `Cart` stores is refreshed after every
/// mutation by [`CartTotals::compute`] and cannot drift.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
    pub item_count: u32,
}

impl CartTotals {
    /// Deterministic totals computation.
    ///
    /// 1. subtotal = Σ unit price × quantity
    /// 2. discount from the applied coupon, never exceeding the subtotal
    /// 3. tax on the pre-discount subtotal
    /// 4. shipping zeroed by the threshold or a free-shipping coupon
    /// 5. total clamped at zero
    pub fn compute(
        items: &[LineItem],
        coupon: Option<&AppliedCoupon>,
        shipping_method: Option<&ShippingMethod>,
        tax_rate: Decimal,
        free_shipping_threshold: Decimal,
        currency: &str,
    ) -> Self {
        let hundred = Decimal::from(100u32);
        let subtotal: Decimal = items.iter().map(|i| i.line_total().amount()).sum();

        let discount = match coupon.map(|c| &c.kind) {
            Some(CouponKind::Percentage(rate)) => (subtotal * *rate / hundred).round_dp(2).min(subtotal),
            Some(CouponKind::FixedAmount(amount)) => (*amount).min(subtotal),
            Some(CouponKind::FreeShipping) | None => Decimal::ZERO,
        };

        let tax = (subtotal * tax_rate / hundred).round_dp(2);

        let free_shipping = subtotal >= free_shipping_threshold
            || matches!(coupon.map(|c| &c.kind), Some(CouponKind::FreeShipping));
        let shipping = if free_shipping {
            Decimal::ZERO
        } else {
            shipping_method.map(|m| m.price.amount()).unwrap_or(Decimal::ZERO)
        };

        let total = (subtotal - discount + tax + shipping).max(Decimal::ZERO);
        let item_count = items.iter().map(|i| i.quantity).sum();

        Self {
            subtotal: Money::new(subtotal, currency),
            discount: Money::new(discount, currency),
            tax: Money::new(tax, currency),
            shipping: Money::new(shipping, currency),
            total: Money::new(total, currency),
            item_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("item not found in cart")]
    ItemNotFound,
    #[error("cart is empty")]
    Empty,
}

/// Shopping cart.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cart {
    id: String,
    items: Vec<LineItem>,
    applied_coupon: Option<AppliedCoupon>,
    shipping_method: Option<ShippingMethod>,
    currency: String,
    tax_rate: Decimal,
    free_shipping_threshold: Decimal,
    totals: CartTotals,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Cart {
    pub fn new(config: &StoreConfig) -> Self {
        let now = Utc::now();
        let mut cart = Self {
            id: Uuid::new_v4().to_string(),
            items: vec![],
            applied_coupon: None,
            shipping_method: None,
            currency: config.currency.clone(),
            tax_rate: config.tax_rate,
            free_shipping_threshold: config.free_shipping_threshold,
            totals: CartTotals::default(),
            created_at: now,
            updated_at: now,
            events: vec![],
        };
        cart.totals = cart.compute_totals();
        cart
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn applied_coupon(&self) -> Option<&AppliedCoupon> { self.applied_coupon.as_ref() }
    pub fn shipping_method(&self) -> Option<&ShippingMethod> { self.shipping_method.as_ref() }
    pub fn totals(&self) -> &CartTotals { &self.totals }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn tax_rate(&self) -> Decimal { self.tax_rate }
    pub fn free_shipping_threshold(&self) -> Decimal { self.free_shipping_threshold }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn unique_item_count(&self) -> usize { self.items.len() }
    pub fn total_quantity(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }

    /// Pure recomputation from the cart's current inputs.
    pub fn compute_totals(&self) -> CartTotals {
        CartTotals::compute(
            &self.items,
            self.applied_coupon.as_ref(),
            self.shipping_method.as_ref(),
            self.tax_rate,
            self.free_shipping_threshold,
            &self.currency,
        )
    }

    fn recalculate(&mut self) {
        self.totals = self.compute_totals();
        self.updated_at = Utc::now();
        self.events.push(DomainEvent::Cart(CartEvent::Updated {
            item_count: self.totals.item_count,
            grand_total: self.totals.total.amount(),
        }));
    }

    /// Adds an item, merging with an existing (product, colour, size) line.
    ///
    /// The stored quantity clamps to the smaller of the resolved stock and
    /// the product's hard cap. Out-of-stock selections are rejected and the
    /// cart is left unchanged.
    pub fn add_item(
        &mut self,
        product: &Product,
        color: Option<&str>,
        size: Option<&str>,
        quantity: u32,
    ) -> Result<(), StockError> {
        if !product.status.is_purchasable() {
            return Err(StockError::Unavailable { product_id: product.id.clone() });
        }
        let info = product.resolve_stock(color, size);
        if info.stock == 0 {
            return Err(StockError::OutOfStock { product_id: product.id.clone() });
        }
        let max = info.stock.min(product.max_quantity);

        if let Some(item) = self.items.iter_mut().find(|i| i.matches(&product.id, color, size)) {
            if item.quantity >= max {
                return Err(StockError::Insufficient {
                    product_id: product.id.clone(),
                    available: max,
                    requested: item.quantity.saturating_add(quantity),
                });
            }
            item.quantity = item.quantity.saturating_add(quantity).min(max);
            item.max_quantity = max;
            item.in_stock = true;
        } else {
            self.items.push(LineItem::from_product(product, color, size, quantity));
        }

        self.recalculate();
        Ok(())
    }

    /// Sets an item's quantity, clamped into `[1, max]`.
    ///
    /// A request of 0 behaves as `remove_item`.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        color: Option<&str>,
        size: Option<&str>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(product_id, color, size);
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.matches(product_id, color, size))
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity.min(item.max_quantity).max(1);
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(
        &mut self,
        product_id: &str,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(product_id, color, size));
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        self.recalculate();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.applied_coupon = None;
        self.recalculate();
    }

    /// Runs the code through the coupon book; on success the returned
    /// descriptor replaces any previously applied coupon.
    ///
    /// A rejection leaves the totals untouched and surfaces the reason.
    pub fn apply_coupon(&mut self, book: &mut CouponBook, code: &str) -> Result<(), CouponError> {
        match book.evaluate(code, &self.totals.subtotal, Utc::now()) {
            Ok(applied) => {
                tracing::debug!(code = %applied.code, "coupon applied to cart");
                self.events.push(DomainEvent::Cart(CartEvent::CouponApplied {
                    code: applied.code.clone(),
                }));
                self.applied_coupon = Some(applied);
                self.recalculate();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(code, reason = %err, "coupon rejected");
                self.events.push(DomainEvent::Cart(CartEvent::CouponRejected {
                    code: code.to_string(),
                    reason: err.to_string(),
                }));
                Err(err)
            }
        }
    }

    /// Clears the applied coupon. Usage counters are not refunded.
    pub fn remove_coupon(&mut self) {
        if self.applied_coupon.take().is_some() {
            self.recalculate();
        }
    }

    pub fn set_shipping_method(&mut self, method: Option<ShippingMethod>) {
        self.shipping_method = method;
        self.recalculate();
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::coupon::CouponRule;
    use crate::domain::aggregates::product::{SizeStock, Variant};
    use crate::domain::value_objects::{Quantity, Sku};

    fn config() -> StoreConfig { StoreConfig::default() }

    fn gown() -> Product {
        let mut p = Product::new("gown-1", Sku::new("GOWN-001").unwrap(), "Silk Gown", Money::ngn(Decimal::new(45000, 0)));
        p.stock = Quantity::new(10);
        p
    }

    fn shirt() -> Product {
        let mut p = Product::new("shirt-1", Sku::new("SHIRT-001").unwrap(), "Oxford Shirt", Money::ngn(Decimal::new(30000, 0)));
        p.variants = vec![Variant {
            color: "White".into(),
            price: None,
            sizes: vec![
                SizeStock { size: "S".into(), stock: 3 },
                SizeStock { size: "M".into(), stock: 0 },
            ],
        }];
        p
    }

    fn amount(n: i64) -> Decimal { Decimal::new(n, 0) }

    #[test]
    fn test_identical_selections_merge() {
        let mut cart = Cart::new(&config());
        cart.add_item(&shirt(), Some("White"), Some("S"), 1).unwrap();
        cart.add_item(&shirt(), Some("White"), Some("S"), 1).unwrap();
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_distinct_sizes_do_not_merge() {
        let mut cart = Cart::new(&config());
        let mut p = shirt();
        p.variants[0].sizes[1].stock = 4;
        cart.add_item(&p, Some("White"), Some("S"), 1).unwrap();
        cart.add_item(&p, Some("White"), Some("M"), 1).unwrap();
        assert_eq!(cart.unique_item_count(), 2);
    }

    #[test]
    fn test_welcome10_totals_breakdown() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 1).unwrap();
        cart.set_shipping_method(Some(ShippingMethod::standard()));
        let mut book = CouponBook::reference();
        cart.apply_coupon(&mut book, "WELCOME10").unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal.amount(), amount(45000));
        assert_eq!(totals.discount.amount(), amount(4500));
        assert_eq!(totals.tax.amount(), amount(3375));
        assert_eq!(totals.shipping.amount(), amount(2500));
        assert_eq!(totals.total.amount(), amount(46375));
    }

    #[test]
    fn test_threshold_forces_free_shipping() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 2).unwrap();
        cart.set_shipping_method(Some(ShippingMethod::express()));
        assert_eq!(cart.totals().subtotal.amount(), amount(90000));
        assert_eq!(cart.totals().shipping.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_clamps_to_stock() {
        let mut cart = Cart::new(&config());
        cart.add_item(&shirt(), Some("White"), Some("S"), 1).unwrap();
        cart.update_quantity("shirt-1", Some("White"), Some("S"), 5).unwrap();
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_invalid_coupon_leaves_totals_unchanged() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 1).unwrap();
        cart.set_shipping_method(Some(ShippingMethod::standard()));
        let before = cart.totals().clone();

        let mut book = CouponBook::reference();
        let err = cart.apply_coupon(&mut book, "INVALID").unwrap_err();
        assert_eq!(err, CouponError::NotFound);
        assert_eq!(cart.totals(), &before);
    }

    #[test]
    fn test_out_of_stock_add_rejected() {
        let mut cart = Cart::new(&config());
        let err = cart.add_item(&shirt(), Some("White"), Some("M"), 1).unwrap_err();
        assert!(matches!(err, StockError::OutOfStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_beyond_max_is_rejected() {
        let mut cart = Cart::new(&config());
        cart.add_item(&shirt(), Some("White"), Some("S"), 3).unwrap();
        let err = cart.add_item(&shirt(), Some("White"), Some("S"), 1).unwrap_err();
        assert!(matches!(err, StockError::Insufficient { available: 3, .. }));
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_update_to_zero_removes() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 1).unwrap();
        cart.update_quantity("gown-1", None, None, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity("gown-1", None, None, 1), Err(CartError::ItemNotFound));
    }

    #[test]
    fn test_coupon_round_trip_restores_totals() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 1).unwrap();
        cart.set_shipping_method(Some(ShippingMethod::standard()));
        let before = cart.totals().clone();

        let mut book = CouponBook::reference();
        cart.apply_coupon(&mut book, "WELCOME10").unwrap();
        assert_ne!(cart.totals(), &before);
        cart.remove_coupon();
        assert_eq!(cart.totals(), &before);
    }

    #[test]
    fn test_new_coupon_replaces_previous() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 1).unwrap();
        let mut book = CouponBook::reference();
        cart.apply_coupon(&mut book, "WELCOME10").unwrap();
        cart.apply_coupon(&mut book, "FREESHIP").unwrap();
        assert_eq!(cart.applied_coupon().map(|c| c.code.as_str()), Some("FREESHIP"));
    }

    #[test]
    fn test_free_shipping_coupon_zeroes_shipping_only() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 1).unwrap();
        cart.set_shipping_method(Some(ShippingMethod::standard()));
        let mut book = CouponBook::reference();
        cart.apply_coupon(&mut book, "FREESHIP").unwrap();

        assert_eq!(cart.totals().discount.amount(), Decimal::ZERO);
        assert_eq!(cart.totals().shipping.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_discount_caps_at_subtotal() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 1).unwrap();
        cart.set_shipping_method(Some(ShippingMethod::standard()));
        let mut book = CouponBook::with_rules([CouponRule::fixed("BIG", amount(99999))]);
        cart.apply_coupon(&mut book, "BIG").unwrap();

        let totals = cart.totals();
        assert_eq!(totals.discount, totals.subtotal);
        assert!(totals.total.amount() >= Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_invariant_after_mutations() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 2).unwrap();
        cart.add_item(&shirt(), Some("White"), Some("S"), 1).unwrap();
        cart.update_quantity("gown-1", None, None, 1).unwrap();
        cart.remove_item("shirt-1", Some("White"), Some("S")).unwrap();

        let expected: Decimal = cart
            .items()
            .iter()
            .map(|i| i.unit_price.amount() * Decimal::from(i.quantity))
            .sum();
        assert_eq!(cart.totals().subtotal.amount(), expected);
        assert_eq!(cart.totals(), &cart.compute_totals());
    }

    #[test]
    fn test_clear_resets_items_and_coupon() {
        let mut cart = Cart::new(&config());
        cart.add_item(&gown(), None, None, 1).unwrap();
        let mut book = CouponBook::reference();
        cart.apply_coupon(&mut book, "WELCOME10").unwrap();
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.applied_coupon().is_none());
        assert_eq!(cart.totals().total.amount(), Decimal::ZERO);
    }
}
