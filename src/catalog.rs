//! Product catalog interface
//!
//! The engine consumes the catalog as a read-only capability: given a
//! product id, return its variant/size/stock matrix. Where that data
//! actually lives is the embedding application's concern.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::aggregates::product::{PreorderInfo, Product, SizeStock, Variant};
use crate::domain::value_objects::{Money, Quantity, Sku};

pub trait ProductCatalog {
    fn product_by_id(&self, id: &str) -> Option<&Product>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    products: HashMap<String, Product>,
}

impl MemoryCatalog {
    pub fn new() -> Self { Self::default() }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut catalog = Self::new();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }
}

impl ProductCatalog for MemoryCatalog {
    fn product_by_id(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }
}

/// Fixture catalog used by the demo binary.
pub fn demo_catalog() -> MemoryCatalog {
    let mut gown = Product::new(
        "silk-gown",
        Sku::new("GOWN-001").unwrap(),
        "Silk Evening Gown",
        Money::ngn(Decimal::new(45000, 0)),
    );
    gown.stock = Quantity::new(10);

    let mut shirt = Product::new(
        "oxford-shirt",
        Sku::new("SHIRT-001").unwrap(),
        "Oxford Shirt",
        Money::ngn(Decimal::new(30000, 0)),
    );
    shirt.variants = vec![
        Variant {
            color: "White".into(),
            price: None,
            sizes: vec![
                SizeStock { size: "S".into(), stock: 3 },
                SizeStock { size: "M".into(), stock: 6 },
                SizeStock { size: "L".into(), stock: 2 },
            ],
        },
        Variant {
            color: "Navy".into(),
            price: Some(Money::ngn(Decimal::new(32000, 0))),
            sizes: vec![
                SizeStock { size: "M".into(), stock: 4 },
                SizeStock { size: "L".into(), stock: 0 },
            ],
        },
    ];

    let mut scarf = Product::new(
        "cashmere-scarf",
        Sku::new("SCARF-001").unwrap(),
        "Cashmere Scarf",
        Money::ngn(Decimal::new(20000, 0)),
    );
    scarf.sale_price = Some(Money::ngn(Decimal::new(15000, 0)));
    scarf.stock = Quantity::new(5);
    scarf.preorder = Some(PreorderInfo {
        estimated_delivery: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap_or_default(),
    });

    MemoryCatalog::with_products([gown, shirt, scarf])
}
