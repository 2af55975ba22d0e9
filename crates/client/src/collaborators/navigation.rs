//! Client-side route changes.

use std::sync::{Arc, Mutex, PoisonError};

/// Changes the current client-side route. Fire-and-forget.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

/// Landing routes used by the auth transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    /// Where a successful login or signup lands.
    pub home: String,
    /// Where a logout lands.
    pub login: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            home: "/home".to_string(),
            login: "/login".to_string(),
        }
    }
}

/// In-memory navigation history.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Arc<Mutex<Vec<String>>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The route most recently navigated to.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    /// Every route navigated to, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for History {
    fn navigate_to(&self, path: &str) {
        tracing::debug!(path, "Navigating");
        self.lock().push(path.to_owned());
    }
}
