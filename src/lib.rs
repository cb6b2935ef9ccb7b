//! Storefront Core
//!
//! Direct-to-consumer storefront engine: cart pricing, coupon handling,
//! checkout, and order lifecycle tracking.
//!
//! ## Features
//! - Stock-aware cart over a variant/size matrix
//! - Coupon evaluation (percentage, fixed amount, free shipping)
//! - Order factory with independent totals recomputation
//! - Simulated payment gateway with injectable failure strategy
//! - Order status state machine with tracking history
//! - Pluggable client-side persistence

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod payment;
pub mod shipping;
pub mod store;

use thiserror::Error;

pub use crate::config::StoreConfig;
pub use crate::domain::aggregates::cart::{Cart, CartError, CartTotals, LineItem};
pub use crate::domain::aggregates::coupon::{
    AppliedCoupon, CouponBook, CouponError, CouponKind, CouponRule,
};
pub use crate::domain::aggregates::order::{
    Order, OrderStatus, PaymentMethod, PaymentStatus, TrackingEvent, TransitionError,
};
pub use crate::domain::aggregates::product::{
    Product, ProductStatus, StockError, StockInfo, VariantSelection,
};
pub use crate::domain::events::{CartEvent, DomainEvent, OrderEvent};
pub use crate::domain::value_objects::{Address, Money, Quantity, Sku};
pub use crate::payment::PaymentError;
pub use crate::shipping::ShippingMethod;
pub use crate::store::StorageError;

// =============================================================================
// Error Types
// =============================================================================

/// Unified storefront error.
///
/// Stock and coupon rejections are recoverable — the engine leaves state
/// unchanged and the cart stays usable. Payment errors are transient and
/// retried manually by the caller. Transition errors indicate a bug in the
/// calling layer but still fail without corrupting state.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("checkout validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
