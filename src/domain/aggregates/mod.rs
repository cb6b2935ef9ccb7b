//! Aggregates module
pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;

pub use cart::{Cart, CartError, CartTotals, LineItem};
pub use coupon::{AppliedCoupon, CouponBook, CouponError, CouponKind, CouponRule};
pub use order::{Order, OrderStatus, PaymentMethod, PaymentStatus, TrackingEvent, TransitionError};
pub use product::{Product, ProductStatus, StockError, StockInfo, VariantSelection};
