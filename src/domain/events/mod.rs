//! Domain events
//!
//! Aggregates raise events as they mutate; the embedding layer (UI,
//! notifications) drains them with `take_events()`.

use crate::domain::aggregates::order::OrderStatus;
use rust_decimal::Decimal;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Cart(CartEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug)]
pub enum CartEvent {
    Updated { item_count: u32, grand_total: Decimal },
    CouponApplied { code: String },
    CouponRejected { code: String, reason: String },
}

#[derive(Clone, Debug)]
pub enum OrderEvent {
    Created { order_id: String, order_number: String, total: Decimal },
    PaymentSucceeded { order_id: String, reference: String },
    PaymentFailed { order_id: String, reason: String },
    StatusChanged { order_id: String, from: OrderStatus, to: OrderStatus },
}
