//! Checkout: snapshotting a cart into an order
//!
//! The factory recomputes totals from the snapshot's line items itself; a
//! caller-supplied total is never trusted, which guards against stale
//! client state reaching the order.

use chrono::Utc;
use validator::Validate;

use crate::domain::aggregates::cart::{Cart, CartError, CartTotals};
use crate::domain::aggregates::order::{Order, PaymentMethod};
use crate::domain::value_objects::Address;
use crate::shipping::ShippingMethod;
use crate::StorefrontError;

/// Shipping, billing and payment selections collected at checkout.
#[derive(Clone, Debug, Validate)]
pub struct CheckoutRequest {
    #[validate]
    pub shipping_address: Address,
    #[validate]
    pub billing_address: Address,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
}

pub struct OrderFactory;

impl OrderFactory {
    /// Snapshots a validated cart into an immutable order.
    ///
    /// The order starts Pending/Pending; all later changes go through the
    /// lifecycle operations on [`Order`], never back through the factory.
    pub fn create_order(cart: &Cart, request: CheckoutRequest) -> Result<Order, StorefrontError> {
        request.validate()?;
        if cart.is_empty() {
            return Err(CartError::Empty.into());
        }

        let totals = CartTotals::compute(
            cart.items(),
            cart.applied_coupon(),
            Some(&request.shipping_method),
            cart.tax_rate(),
            cart.free_shipping_threshold(),
            cart.currency(),
        );

        let order_number = generate_order_number();
        tracing::info!(%order_number, total = %totals.total, "order created from cart snapshot");

        Ok(Order::new(
            order_number,
            cart.items().to_vec(),
            totals,
            cart.applied_coupon().cloned(),
            request.shipping_address,
            request.billing_address,
            request.shipping_method,
            request.payment_method,
        ))
    }
}

/// Time-derived component plus a short random suffix. Good enough to
/// avoid collision under normal session volume; retry-on-duplicate is the
/// caller's responsibility if persistence is added.
fn generate_order_number() -> String {
    let suffix: u16 = rand::random();
    format!("ORD-{}-{:04X}", Utc::now().format("%y%m%d%H%M%S"), suffix)
}
