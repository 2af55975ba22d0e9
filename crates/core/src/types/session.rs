//! Anonymous session identifier and cart lookup key.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::auth::Identity;
use super::id::UserId;

/// Opaque identifier the server assigns to a browser session.
///
/// Used as the cart join key while nobody is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a session identifier returned by the server.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the server handed back an empty identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The key a cart is looked up by.
///
/// Serializes untagged: a bare user id number or a bare session string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CartKey {
    /// Cart owned by a signed-in user.
    User(UserId),
    /// Cart attached to an anonymous session.
    Session(SessionId),
}

impl CartKey {
    /// Derive the authoritative key: the identity's id when signed in,
    /// otherwise the session identifier.
    ///
    /// Returns `None` when neither is known (or the session id is empty).
    #[must_use]
    pub fn derive(identity: &Identity, session_id: Option<&SessionId>) -> Option<Self> {
        if let Some(user) = identity.user() {
            return Some(Self::User(user.id));
        }
        session_id
            .filter(|id| !id.is_empty())
            .map(|id| Self::Session(id.clone()))
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Session(id) => write!(f, "session:{id}"),
        }
    }
}
