//! Product aggregate and stock resolution
//!
//! The stock resolver is a pure lookup over the product's variant/size
//! matrix, falling back to the flat stock count for products without
//! variants. It is the leaf dependency of the cart engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::{Money, Quantity, Sku};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: Sku,
    pub name: String,
    /// Base price, overridden by `sale_price` when a sale is running.
    pub price: Money,
    pub sale_price: Option<Money>,
    pub variants: Vec<Variant>,
    /// Flat stock count, only consulted when `variants` is empty.
    pub stock: Quantity,
    /// Per-product hard cap on cart quantity, independent of stock.
    pub max_quantity: u32,
    pub status: ProductStatus,
    pub preorder: Option<PreorderInfo>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variant {
    pub color: String,
    /// Variant-level price override.
    pub price: Option<Money>,
    pub sizes: Vec<SizeStock>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SizeStock {
    pub size: String,
    pub stock: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    Draft,
    #[default]
    Active,
    Archived,
}

impl ProductStatus {
    pub fn is_purchasable(&self) -> bool { matches!(self, Self::Active) }
}

/// Pre-order metadata carried onto line items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreorderInfo {
    pub estimated_delivery: NaiveDate,
}

/// Result of a stock lookup: availability and effective per-unit price.
#[derive(Clone, Debug, PartialEq)]
pub struct StockInfo {
    pub stock: u32,
    pub unit_price: Money,
}

impl Product {
    pub fn new(id: impl Into<String>, sku: Sku, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            sku,
            name: name.into(),
            price,
            sale_price: None,
            variants: vec![],
            stock: Quantity::default(),
            max_quantity: 10,
            status: ProductStatus::Active,
            preorder: None,
        }
    }

    /// Effective per-unit price: the sale price when present, else base.
    pub fn effective_price(&self) -> Money {
        self.sale_price.clone().unwrap_or_else(|| self.price.clone())
    }

    pub fn variant(&self, color: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.color.eq_ignore_ascii_case(color))
    }

    /// Resolves available stock and the effective unit price for a
    /// variant/size selection.
    ///
    /// With variants defined, the colour narrows to a variant and the size
    /// narrows to a stock count; an absent variant/size pair resolves to
    /// stock 0. Without variants the flat stock count and base price apply.
    pub fn resolve_stock(&self, color: Option<&str>, size: Option<&str>) -> StockInfo {
        if self.variants.is_empty() {
            return StockInfo { stock: self.stock.value(), unit_price: self.effective_price() };
        }

        let Some(variant) = color.and_then(|c| self.variant(c)) else {
            return StockInfo { stock: 0, unit_price: self.effective_price() };
        };

        let stock = size
            .and_then(|s| variant.sizes.iter().find(|x| x.size.eq_ignore_ascii_case(s)))
            .map(|x| x.stock)
            .unwrap_or(0);
        let unit_price = variant.price.clone().unwrap_or_else(|| self.effective_price());
        StockInfo { stock, unit_price }
    }

    pub fn is_in_stock(&self) -> bool {
        if self.variants.is_empty() {
            return !self.stock.is_zero();
        }
        self.variants.iter().any(|v| v.sizes.iter().any(|s| s.stock > 0))
    }
}

/// Tracks the shopper's current variant/size choice on a product page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantSelection {
    pub color: Option<String>,
    pub size: Option<String>,
}

impl VariantSelection {
    /// Selects a colour and resets the size to the first one the new
    /// variant offers, so a size invalid for the new variant is never
    /// silently kept.
    pub fn select_color(&mut self, product: &Product, color: &str) {
        self.color = Some(color.to_string());
        self.size = product
            .variant(color)
            .and_then(|v| v.sizes.first())
            .map(|s| s.size.clone());
    }

    pub fn select_size(&mut self, size: &str) {
        self.size = Some(size.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("product {product_id} is out of stock for the selected option")]
    OutOfStock { product_id: String },
    #[error("requested {requested} of product {product_id} but only {available} can be carted")]
    Insufficient { product_id: String, available: u32, requested: u32 },
    #[error("product {product_id} is not available for purchase")]
    Unavailable { product_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn shirt() -> Product {
        let mut p = Product::new("P1", Sku::new("SHIRT-001").unwrap(), "Oxford Shirt", Money::ngn(Decimal::new(45000, 0)));
        p.variants = vec![
            Variant {
                color: "White".into(),
                price: None,
                sizes: vec![
                    SizeStock { size: "S".into(), stock: 3 },
                    SizeStock { size: "M".into(), stock: 0 },
                ],
            },
            Variant {
                color: "Navy".into(),
                price: Some(Money::ngn(Decimal::new(48000, 0))),
                sizes: vec![SizeStock { size: "L".into(), stock: 5 }],
            },
        ];
        p
    }

    #[test]
    fn test_flat_stock_fallback() {
        let mut p = Product::new("P2", Sku::new("BELT-001").unwrap(), "Belt", Money::ngn(Decimal::new(12000, 0)));
        p.stock = Quantity::new(7);
        let info = p.resolve_stock(None, None);
        assert_eq!(info.stock, 7);
        assert_eq!(info.unit_price.amount(), Decimal::new(12000, 0));
    }

    #[test]
    fn test_variant_size_lookup() {
        let info = shirt().resolve_stock(Some("White"), Some("S"));
        assert_eq!(info.stock, 3);
        assert_eq!(info.unit_price.amount(), Decimal::new(45000, 0));
    }

    #[test]
    fn test_absent_pair_resolves_to_zero() {
        let p = shirt();
        assert_eq!(p.resolve_stock(Some("White"), Some("XL")).stock, 0);
        assert_eq!(p.resolve_stock(Some("Green"), Some("S")).stock, 0);
        assert_eq!(p.resolve_stock(Some("White"), None).stock, 0);
    }

    #[test]
    fn test_variant_price_override() {
        let info = shirt().resolve_stock(Some("Navy"), Some("L"));
        assert_eq!(info.unit_price.amount(), Decimal::new(48000, 0));
    }

    #[test]
    fn test_sale_price_is_effective() {
        let mut p = Product::new("P3", Sku::new("SCARF-001").unwrap(), "Scarf", Money::ngn(Decimal::new(20000, 0)));
        p.sale_price = Some(Money::ngn(Decimal::new(15000, 0)));
        p.stock = Quantity::new(2);
        assert_eq!(p.resolve_stock(None, None).unit_price.amount(), Decimal::new(15000, 0));
    }

    #[test]
    fn test_color_switch_resets_size() {
        let p = shirt();
        let mut sel = VariantSelection::default();
        sel.select_color(&p, "White");
        sel.select_size("M");
        sel.select_color(&p, "Navy");
        assert_eq!(sel.size.as_deref(), Some("L"));
    }
}
