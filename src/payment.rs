//! Simulated payment gateway
//!
//! Models the external call's latency and failure modes without ever
//! touching order state: the caller routes a receipt or an error through
//! the order's payment-recording operations.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::domain::aggregates::order::PaymentMethod;
use crate::domain::value_objects::Money;

/// Failure policy, injectable so tests get deterministic outcomes.
pub trait FailureStrategy: Send + Sync {
    fn should_fail(&self) -> bool;
}

/// Nonzero random failure probability.
#[derive(Clone, Debug)]
pub struct RandomFailure {
    pub probability: f64,
}

impl FailureStrategy for RandomFailure {
    fn should_fail(&self) -> bool {
        rand::random::<f64>() < self.probability
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AlwaysSucceed;

impl FailureStrategy for AlwaysSucceed {
    fn should_fail(&self) -> bool { false }
}

#[derive(Clone, Copy, Debug)]
pub struct AlwaysFail;

impl FailureStrategy for AlwaysFail {
    fn should_fail(&self) -> bool { true }
}

/// Charge request, keyed by the existing order: retrying after a failure
/// can never create a second order.
#[derive(Clone, Debug)]
pub struct PaymentRequest {
    pub order_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaymentReceipt {
    pub reference: String,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Transient gateway failure; the same request may simply be retried.
    #[error("payment gateway declined the charge for order {order_id}")]
    GatewayDeclined { order_id: String },
}

pub struct PaymentSimulator {
    latency: Duration,
    strategy: Box<dyn FailureStrategy>,
}

impl PaymentSimulator {
    pub fn new(latency: Duration, strategy: impl FailureStrategy + 'static) -> Self {
        Self { latency, strategy: Box::new(strategy) }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            Duration::from_millis(config.payment_latency_ms),
            RandomFailure { probability: config.payment_failure_rate },
        )
    }

    /// Simulates the gateway round-trip.
    pub async fn process(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        tokio::time::sleep(self.latency).await;

        if self.strategy.should_fail() {
            tracing::warn!(order_id = %request.order_id, "payment declined");
            return Err(PaymentError::GatewayDeclined { order_id: request.order_id.clone() });
        }

        let receipt = PaymentReceipt {
            reference: format!("PAY-{}", Uuid::new_v4().simple()),
            processed_at: Utc::now(),
        };
        tracing::info!(
            order_id = %request.order_id,
            reference = %receipt.reference,
            amount = %request.amount,
            "payment captured"
        );
        Ok(receipt)
    }
}

impl std::fmt::Debug for PaymentSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentSimulator").field("latency", &self.latency).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn request() -> PaymentRequest {
        PaymentRequest {
            order_id: "order-1".into(),
            amount: Money::ngn(Decimal::new(46375, 0)),
            method: PaymentMethod::Card,
        }
    }

    #[tokio::test]
    async fn test_success_produces_reference() {
        let sim = PaymentSimulator::new(Duration::ZERO, AlwaysSucceed);
        let receipt = sim.process(&request()).await.unwrap();
        assert!(receipt.reference.starts_with("PAY-"));
    }

    #[tokio::test]
    async fn test_failure_is_safe_to_retry() {
        let sim = PaymentSimulator::new(Duration::ZERO, AlwaysFail);
        let req = request();
        let first = sim.process(&req).await.unwrap_err();
        let second = sim.process(&req).await.unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first, PaymentError::GatewayDeclined { order_id: "order-1".into() });
    }

    #[tokio::test]
    async fn test_zero_probability_never_fails() {
        let sim = PaymentSimulator::new(Duration::ZERO, RandomFailure { probability: 0.0 });
        for _ in 0..20 {
            assert!(sim.process(&request()).await.is_ok());
        }
    }
}
