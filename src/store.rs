//! State container and persistence seam
//!
//! All engine state lives in an explicit container with a
//! `load → mutate → persist` lifecycle and is passed by reference into the
//! engine — never read from an ambient global. The storage medium is the
//! embedding application's choice; the engine only requires that state
//! round-trips losslessly through the `StorageBackend` seam.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::domain::aggregates::cart::Cart;
use crate::domain::aggregates::coupon::{CouponBook, CouponError};
use crate::domain::aggregates::order::Order;

/// Fixed namespace key for persisted engine state.
pub const STORAGE_NAMESPACE: &str = "storefront.state.v1";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub trait StorageBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, payload: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend; doubles as the test double.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Everything the storefront persists between sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorefrontState {
    pub cart: Cart,
    pub orders: Vec<Order>,
    pub coupons: CouponBook,
}

impl StorefrontState {
    fn fresh(config: &StoreConfig) -> Self {
        Self { cart: Cart::new(config), orders: vec![], coupons: CouponBook::reference() }
    }
}

pub struct StorefrontStore<S: StorageBackend> {
    storage: S,
    state: StorefrontState,
}

impl<S: StorageBackend> StorefrontStore<S> {
    /// Rehydrates persisted state from the backend, or starts fresh.
    pub fn load(storage: S, config: &StoreConfig) -> Result<Self, StorageError> {
        let state = match storage.load(STORAGE_NAMESPACE)? {
            Some(payload) => serde_json::from_str(&payload)?,
            None => StorefrontState::fresh(config),
        };
        Ok(Self { storage, state })
    }

    pub fn cart(&self) -> &Cart { &self.state.cart }
    pub fn cart_mut(&mut self) -> &mut Cart { &mut self.state.cart }
    pub fn coupons(&self) -> &CouponBook { &self.state.coupons }
    pub fn orders(&self) -> &[Order] { &self.state.orders }

    pub fn order_by_number(&self, order_number: &str) -> Option<&Order> {
        self.state.orders.iter().find(|o| o.order_number() == order_number)
    }

    pub fn order_by_number_mut(&mut self, order_number: &str) -> Option<&mut Order> {
        self.state.orders.iter_mut().find(|o| o.order_number() == order_number)
    }

    pub fn insert_order(&mut self, order: Order) {
        self.state.orders.push(order);
    }

    /// Applies a coupon code to the cart through the store's coupon book.
    pub fn apply_coupon(&mut self, code: &str) -> Result<(), CouponError> {
        let StorefrontState { cart, coupons, .. } = &mut self.state;
        cart.apply_coupon(coupons, code)
    }

    /// Replaces the cart with a fresh one, as after a completed checkout.
    pub fn reset_cart(&mut self, config: &StoreConfig) {
        self.state.cart = Cart::new(config);
    }

    pub fn persist(&mut self) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&self.state)?;
        self.storage.save(STORAGE_NAMESPACE, &payload)
    }

    pub fn into_storage(self) -> S { self.storage }
}
