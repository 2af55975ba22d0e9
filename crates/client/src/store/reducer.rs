//! Pure reducers, one per slice.
//!
//! Each reducer takes the current slice by value and returns the next one.
//! They never fail and never touch the outside world, so any recorded
//! sequence of actions can be replayed through them.

use std::collections::HashSet;

use shopper_core::{AuthPhase, CartKey, Entity, Identity, Product, SessionId, User};

use super::State;
use super::action::{Action, EntityAction};

/// Fold one action into the whole state tree.
#[must_use]
pub fn reduce(state: State, action: &Action) -> State {
    let identity = identity(state.identity, action);
    let auth_phase = auth_phase(state.auth_phase, action, &identity);

    State {
        products: products(state.products, action),
        users: users(state.users, action),
        identity,
        session_id: session_id(state.session_id, action),
        auth_phase,
        cart_key: cart_key(state.cart_key, action),
    }
}

#[must_use]
pub fn products(state: Vec<Product>, action: &Action) -> Vec<Product> {
    match action {
        Action::Products(action) => collection(state, action),
        _ => state,
    }
}

#[must_use]
pub fn users(state: Vec<User>, action: &Action) -> Vec<User> {
    match action {
        Action::Users(action) => collection(state, action),
        _ => state,
    }
}

/// Apply an entity action while keeping ids unique.
///
/// `Created` evicts any record already holding the id before prepending,
/// and `Replaced` keeps only the first record per id. `Updated` for an
/// unknown id changes nothing.
#[must_use]
pub fn collection<E: Entity>(mut items: Vec<E>, action: &EntityAction<E>) -> Vec<E> {
    match action {
        EntityAction::Replaced(replacement) => {
            let mut seen = HashSet::with_capacity(replacement.len());
            replacement
                .iter()
                .filter(|item| seen.insert(item.id()))
                .cloned()
                .collect()
        }
        EntityAction::Created(item) => {
            let id = item.id();
            let mut next = Vec::with_capacity(items.len() + 1);
            next.push(item.clone());
            next.extend(items.into_iter().filter(|existing| existing.id() != id));
            next
        }
        EntityAction::Removed(id) => {
            items.retain(|existing| existing.id() != *id);
            items
        }
        EntityAction::Updated(item) => {
            let id = item.id();
            for existing in &mut items {
                if existing.id() == id {
                    *existing = item.clone();
                }
            }
            items
        }
    }
}

#[must_use]
pub fn identity(state: Identity, action: &Action) -> Identity {
    match action {
        Action::IdentitySet(identity) => identity.clone(),
        Action::IdentityCleared => Identity::Anonymous,
        _ => state,
    }
}

/// Sessions are only ever reassigned, never cleared.
#[must_use]
pub fn session_id(state: Option<SessionId>, action: &Action) -> Option<SessionId> {
    match action {
        Action::SessionSet(id) => Some(id.clone()),
        _ => state,
    }
}

/// Phase follows the request lifecycle; settled phases are derived from the
/// identity that results from the same action.
#[must_use]
pub fn auth_phase(state: AuthPhase, action: &Action, identity: &Identity) -> AuthPhase {
    match action {
        Action::AuthRequested => AuthPhase::Authenticating,
        Action::LogoutRequested => AuthPhase::LoggingOut,
        Action::IdentitySet(_) | Action::IdentityCleared | Action::AuthFailed => {
            AuthPhase::settled(identity)
        }
        _ => state,
    }
}

/// Last requested key wins. Clearing the identity unkeys the cart until the
/// next request, so a signed-out user's key never outlives the sign-out.
#[must_use]
pub fn cart_key(state: Option<CartKey>, action: &Action) -> Option<CartKey> {
    match action {
        Action::CartRequested(key) => Some(key.clone()),
        Action::IdentityCleared => None,
        _ => state,
    }
}
