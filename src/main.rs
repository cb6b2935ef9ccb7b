//! Storefront Core - demo checkout flow
//!
//! Drives one full session against the engine: browse, cart, coupon,
//! checkout, simulated payment, fulfillment.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::catalog::{demo_catalog, ProductCatalog};
use storefront_core::checkout::{CheckoutRequest, OrderFactory};
use storefront_core::payment::{PaymentRequest, PaymentSimulator};
use storefront_core::store::{MemoryStorage, StorefrontStore};
use storefront_core::{Address, OrderStatus, PaymentMethod, ShippingMethod, StoreConfig, TrackingEvent};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env();
    let catalog = demo_catalog();
    let mut store = StorefrontStore::load(MemoryStorage::new(), &config)?;

    // Fill the cart.
    let gown = catalog.product_by_id("silk-gown").ok_or_else(|| anyhow!("missing demo product"))?;
    let shirt = catalog.product_by_id("oxford-shirt").ok_or_else(|| anyhow!("missing demo product"))?;
    store.cart_mut().add_item(gown, None, None, 1)?;
    store.cart_mut().add_item(shirt, Some("White"), Some("M"), 2)?;
    store.cart_mut().set_shipping_method(Some(ShippingMethod::standard()));
    store.apply_coupon("WELCOME10")?;

    let totals = store.cart().totals();
    tracing::info!(
        subtotal = %totals.subtotal,
        discount = %totals.discount,
        tax = %totals.tax,
        shipping = %totals.shipping,
        total = %totals.total,
        "cart ready for checkout"
    );

    // Checkout.
    let address = Address {
        name: "Ada Obi".into(),
        street1: "12 Marina Road".into(),
        city: "Lagos".into(),
        state: Some("Lagos".into()),
        zip: "101001".into(),
        country: "NG".into(),
        ..Default::default()
    };
    let mut order = OrderFactory::create_order(
        store.cart(),
        CheckoutRequest {
            shipping_address: address.clone(),
            billing_address: address,
            shipping_method: ShippingMethod::standard(),
            payment_method: PaymentMethod::Card,
        },
    )?;

    // Pay. A failure leaves the order pending for manual retry.
    let simulator = PaymentSimulator::from_config(&config);
    let request = PaymentRequest {
        order_id: order.id().to_string(),
        amount: order.totals().total.clone(),
        method: order.payment_method().clone(),
    };
    match simulator.process(&request).await {
        Ok(receipt) => {
            order.record_payment(receipt.reference);
            order.update_status(OrderStatus::Confirmed)?;
            order.update_status(OrderStatus::Processing)?;
            order.update_status(OrderStatus::Shipped)?;
            order.set_tracking_number("NG-1Z999AA1");
            order.append_tracking_event(
                TrackingEvent::new(OrderStatus::Shipped, "Package left the warehouse")
                    .with_location("Lagos"),
            )?;
        }
        Err(err) => {
            tracing::warn!(%err, "payment failed; order stays pending for retry");
            order.record_payment_failure(err.to_string());
        }
    }

    for event in order.take_events() {
        tracing::info!(?event, "domain event");
    }
    for event in store.cart_mut().take_events() {
        tracing::debug!(?event, "cart event");
    }

    tracing::info!(order_number = %order.order_number(), status = ?order.current_status(), "🛍️ demo flow complete");
    store.insert_order(order);
    store.reset_cart(&config);
    store.persist()?;
    Ok(())
}
