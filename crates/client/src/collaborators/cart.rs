//! Cart collaborator.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use shopper_core::CartKey;

/// Loads the cart for a key. How the key is resolved is up to the
/// implementation; the caller only guarantees the key is the authoritative
/// one at the moment of the call.
pub trait CartFetcher: Send + Sync {
    fn fetch_cart(&self, key: CartKey);
}

/// Cart collaborator that records and logs every requested key.
#[derive(Debug, Clone, Default)]
pub struct CartLog {
    keys: Arc<Mutex<Vec<CartKey>>>,
}

impl CartLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every key requested so far, oldest first.
    #[must_use]
    pub fn keys(&self) -> Vec<CartKey> {
        self.lock().clone()
    }

    /// The most recent key; the one whose result is authoritative.
    #[must_use]
    pub fn last(&self) -> Option<CartKey> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartKey>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartFetcher for CartLog {
    fn fetch_cart(&self, key: CartKey) {
        info!(key = %key, "Cart requested");
        self.lock().push(key);
    }
}
