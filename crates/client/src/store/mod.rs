//! The client's state tree and its single-writer store.
//!
//! # Flow
//!
//! 1. A service decides what happened and builds an [`Action`]
//! 2. [`Store::dispatch`] folds it through the pure [`reducer`]s
//! 3. Subscribers obtained from [`Store::subscribe`] see the new state
//!
//! Dispatch runs to completion before returning, so no observer ever sees a
//! half-applied action.

mod action;
pub mod reducer;

pub use action::{Action, EntityAction};

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use shopper_core::{AuthPhase, CartKey, Entity, Identity, Product, SessionId, User};

use crate::api::{ADMIN_USERS_PATH, PRODUCTS_PATH};

/// Everything the client knows about the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct State {
    /// Catalog products, most recently created first.
    pub products: Vec<Product>,
    /// Users listed in the admin view.
    pub users: Vec<User>,
    pub identity: Identity,
    /// Unset until the first successful session request.
    pub session_id: Option<SessionId>,
    pub auth_phase: AuthPhase,
    /// Key of the most recently requested cart.
    pub cart_key: Option<CartKey>,
}

impl State {
    /// Rebuild a state by folding `actions` over the default state.
    #[must_use]
    pub fn replay<'a>(actions: impl IntoIterator<Item = &'a Action>) -> Self {
        actions
            .into_iter()
            .fold(Self::default(), |state, action| reducer::reduce(state, action))
    }

    /// The key a cart should be fetched with right now.
    #[must_use]
    pub fn authoritative_cart_key(&self) -> Option<CartKey> {
        CartKey::derive(&self.identity, self.session_id.as_ref())
    }
}

/// An entity collection held in the state tree and served by the backend.
pub trait Collection: Entity {
    /// REST collection path.
    const PATH: &'static str;
    /// Singular noun for logs.
    const NOUN: &'static str;

    /// Wrap an entity action in the store's action type.
    fn action(action: EntityAction<Self>) -> Action;

    /// Borrow this collection's slice of the state.
    fn slice(state: &State) -> &[Self];
}

impl Collection for Product {
    const PATH: &'static str = PRODUCTS_PATH;
    const NOUN: &'static str = "product";

    fn action(action: EntityAction<Self>) -> Action {
        Action::Products(action)
    }

    fn slice(state: &State) -> &[Self] {
        &state.products
    }
}

impl Collection for User {
    const PATH: &'static str = ADMIN_USERS_PATH;
    const NOUN: &'static str = "user";

    fn action(action: EntityAction<Self>) -> Action {
        Action::Users(action)
    }

    fn slice(state: &State) -> &[Self] {
        &state.users
    }
}

/// Cheaply cloneable handle to the one state tree.
///
/// All writes go through [`dispatch`](Self::dispatch).
#[derive(Clone)]
pub struct Store {
    state: Arc<watch::Sender<State>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store holding the default (empty, anonymous) state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(State::default())
    }

    /// Create a store seeded with `state`.
    #[must_use]
    pub fn with_state(state: State) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            state: Arc::new(state),
        }
    }

    /// Apply an action and notify subscribers.
    pub fn dispatch(&self, action: Action) {
        debug!(action = action.name(), "Dispatching action");
        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reducer::reduce(current, &action);
        });
    }

    /// Clone the current state.
    #[must_use]
    pub fn snapshot(&self) -> State {
        self.state.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Watch for state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }
}
