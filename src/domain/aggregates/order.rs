//! Order aggregate and lifecycle
//!
//! An order is an immutable snapshot of a cart at checkout; after creation
//! it only changes through the status machine and tracking log below.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::cart::{CartTotals, LineItem};
use crate::domain::aggregates::coupon::AppliedCoupon;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Address;
use crate::shipping::ShippingMethod;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// The legal-transition table.
    ///
    /// Forward path: Pending → Confirmed → Processing → Shipped → Delivered.
    /// Cancellation is possible up to (and including) Processing. Delivered
    /// admits only the refund-recording edge; Cancelled and Refunded admit
    /// nothing.
    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Processing)
                | (Confirmed, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Delivered, Refunded)
        )
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Processing)
    }

    /// Statuses from which no transition of any kind remains.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Card,
    BankTransfer,
    PayOnDelivery,
}

/// A timestamped entry in an order's delivery history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub timestamp: DateTime<Utc>,
    pub status: OrderStatus,
    pub description: String,
    pub location: Option<String>,
}

impl TrackingEvent {
    pub fn new(status: OrderStatus, description: impl Into<String>) -> Self {
        Self { timestamp: Utc::now(), status, description: description.into(), location: None }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("illegal order transition {from:?} -> {to:?}")]
    Illegal { from: OrderStatus, to: OrderStatus },
    #[error("tracking event timestamp precedes the existing history")]
    StaleTrackingEvent,
}

/// Order aggregate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    id: String,
    order_number: String,
    items: Vec<LineItem>,
    totals: CartTotals,
    applied_coupon: Option<AppliedCoupon>,
    shipping_address: Address,
    billing_address: Address,
    shipping_method: ShippingMethod,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    status: OrderStatus,
    tracking_number: Option<String>,
    tracking: Vec<TrackingEvent>,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        order_number: String,
        items: Vec<LineItem>,
        totals: CartTotals,
        applied_coupon: Option<AppliedCoupon>,
        shipping_address: Address,
        billing_address: Address,
        shipping_method: ShippingMethod,
        payment_method: PaymentMethod,
    ) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut order = Self {
            id: id.clone(),
            order_number: order_number.clone(),
            items,
            totals,
            applied_coupon,
            shipping_address,
            billing_address,
            shipping_method,
            payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            tracking_number: None,
            tracking: vec![],
            delivered_at: None,
            created_at: now,
            updated_at: now,
            events: vec![],
        };
        let total = order.totals.total.amount();
        order.raise_event(DomainEvent::Order(OrderEvent::Created {
            order_id: id,
            order_number,
            total,
        }));
        order
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn totals(&self) -> &CartTotals { &self.totals }
    pub fn applied_coupon(&self) -> Option<&AppliedCoupon> { self.applied_coupon.as_ref() }
    pub fn shipping_address(&self) -> &Address { &self.shipping_address }
    pub fn billing_address(&self) -> &Address { &self.billing_address }
    pub fn shipping_method(&self) -> &ShippingMethod { &self.shipping_method }
    pub fn payment_method(&self) -> &PaymentMethod { &self.payment_method }
    pub fn payment_status(&self) -> &PaymentStatus { &self.payment_status }
    pub fn status(&self) -> &OrderStatus { &self.status }
    pub fn tracking(&self) -> &[TrackingEvent] { &self.tracking }
    pub fn tracking_number(&self) -> Option<&str> { self.tracking_number.as_deref() }
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> { self.delivered_at }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// The externally visible status: the latest tracking event when a
    /// history exists, the status field otherwise.
    pub fn current_status(&self) -> OrderStatus {
        self.tracking
            .last()
            .map(|e| e.status.clone())
            .unwrap_or_else(|| self.status.clone())
    }

    /// Moves the order along the status machine.
    ///
    /// Transitions outside the legal table fail with no state change; a
    /// transition to Delivered stamps the delivery timestamp.
    pub fn update_status(&mut self, next: OrderStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(&next) {
            return Err(TransitionError::Illegal { from: self.status.clone(), to: next });
        }
        let from = std::mem::replace(&mut self.status, next.clone());
        if next == OrderStatus::Delivered {
            self.delivered_at = Some(Utc::now());
        }
        self.touch();
        tracing::info!(order = %self.order_number, ?from, to = ?next, "order status changed");
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged {
            order_id: self.id.clone(),
            from,
            to: next,
        }));
        Ok(())
    }

    /// Cancels the order; only allowed before shipment.
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        self.update_status(OrderStatus::Cancelled)
    }

    /// Appends a tracking event. Timestamps must be monotonically
    /// non-decreasing with respect to the existing history.
    pub fn append_tracking_event(&mut self, event: TrackingEvent) -> Result<(), TransitionError> {
        if let Some(last) = self.tracking.last() {
            if event.timestamp < last.timestamp {
                return Err(TransitionError::StaleTrackingEvent);
            }
        }
        self.tracking.push(event);
        self.touch();
        Ok(())
    }

    pub fn set_tracking_number(&mut self, number: impl Into<String>) {
        self.tracking_number = Some(number.into());
        self.touch();
    }

    /// Records a successful gateway charge. The payment simulator never
    /// mutates order state itself; callers route its result through here.
    pub fn record_payment(&mut self, reference: impl Into<String>) {
        let reference = reference.into();
        self.payment_status = PaymentStatus::Paid;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::PaymentSucceeded {
            order_id: self.id.clone(),
            reference,
        }));
    }

    pub fn record_payment_failure(&mut self, reason: impl Into<String>) {
        self.payment_status = PaymentStatus::Failed;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::PaymentFailed {
            order_id: self.id.clone(),
            reason: reason.into(),
        }));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
