//! User-visible error reporting.

use std::sync::{Arc, Mutex, PoisonError};

/// Accepts human-readable failure messages for display.
///
/// Fire-and-forget: implementations must not fail or block.
pub trait ErrorChannel: Send + Sync {
    fn report(&self, message: &str);
}

/// In-memory error channel that keeps messages in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl ErrorLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Remove and return every pending message (e.g. once displayed).
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ErrorChannel for ErrorLog {
    fn report(&self, message: &str) {
        self.lock().push(message.to_owned());
    }
}
