//! Server-owned entity records.
//!
//! Records carry a server-assigned identifier plus whatever attributes the
//! backend returns. The client never inspects attributes; they are kept in a
//! JSON map and serialized back verbatim.

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};

/// Attribute fields of an entity, round-tripped without interpretation.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A record identified by a stable, server-assigned id.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// The identifier type, unique within the entity's collection.
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    /// Returns the record's identifier.
    fn id(&self) -> Self::Id;
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Product {
    /// Create a product from its id and attributes.
    #[must_use]
    pub const fn new(id: ProductId, attributes: Attributes) -> Self {
        Self { id, attributes }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// A user account as listed in the admin view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl User {
    /// Create a user record from its id and attributes.
    #[must_use]
    pub const fn new(id: UserId, attributes: Attributes) -> Self {
        Self { id, attributes }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}
