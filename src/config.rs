//! Store configuration

use rust_decimal::Decimal;

/// Pricing and gateway parameters for the storefront.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    pub currency: String,
    /// Tax rate percentage, applied to the pre-discount subtotal.
    pub tax_rate: Decimal,
    /// Subtotal at which shipping is waived regardless of method.
    pub free_shipping_threshold: Decimal,
    /// Simulated gateway latency.
    pub payment_latency_ms: u64,
    /// Simulated gateway failure probability in [0, 1].
    pub payment_failure_rate: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: "NGN".to_string(),
            tax_rate: Decimal::new(75, 1),
            free_shipping_threshold: Decimal::new(50000, 0),
            payment_latency_ms: 800,
            payment_failure_rate: 0.1,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            currency: std::env::var("STORE_CURRENCY").unwrap_or(base.currency),
            tax_rate: std::env::var("STORE_TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.tax_rate),
            free_shipping_threshold: std::env::var("STORE_FREE_SHIPPING_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.free_shipping_threshold),
            payment_latency_ms: std::env::var("PAYMENT_LATENCY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.payment_latency_ms),
            payment_failure_rate: std::env::var("PAYMENT_FAILURE_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.payment_failure_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.tax_rate, Decimal::new(75, 1));
        assert_eq!(config.free_shipping_threshold, Decimal::new(50000, 0));
    }
}
