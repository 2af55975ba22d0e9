//! The closed set of state transitions.

use shopper_core::{CartKey, Entity, Identity, Product, SessionId, User};

/// A transition of one entity collection.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityAction<E: Entity> {
    /// The server's full listing; replaces the collection.
    Replaced(Vec<E>),
    /// A record confirmed by the server; prepended.
    Created(E),
    /// Drop the record with this id.
    Removed(E::Id),
    /// A record confirmed by the server; replaces the one with the same id.
    Updated(E),
}

/// Every action the store understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Products(EntityAction<Product>),
    Users(EntityAction<User>),
    IdentitySet(Identity),
    IdentityCleared,
    SessionSet(SessionId),
    /// A login or signup request was sent.
    AuthRequested,
    /// A logout request was sent.
    LogoutRequested,
    /// A login, signup or logout request failed; the identity is unchanged.
    AuthFailed,
    /// A cart fetch was issued with this key.
    CartRequested(CartKey),
}

impl Action {
    /// Stable name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Products(action) => match action {
                EntityAction::Replaced(_) => "products/replaced",
                EntityAction::Created(_) => "products/created",
                EntityAction::Removed(_) => "products/removed",
                EntityAction::Updated(_) => "products/updated",
            },
            Self::Users(action) => match action {
                EntityAction::Replaced(_) => "users/replaced",
                EntityAction::Created(_) => "users/created",
                EntityAction::Removed(_) => "users/removed",
                EntityAction::Updated(_) => "users/updated",
            },
            Self::IdentitySet(_) => "identity/set",
            Self::IdentityCleared => "identity/cleared",
            Self::SessionSet(_) => "session/set",
            Self::AuthRequested => "auth/requested",
            Self::LogoutRequested => "auth/logout_requested",
            Self::AuthFailed => "auth/failed",
            Self::CartRequested(_) => "cart/requested",
        }
    }
}
