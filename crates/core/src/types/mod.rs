//! Core types for Shopper.
//!
//! This module provides type-safe wrappers for the domain concepts the client
//! keeps in its state tree.

pub mod auth;
pub mod email;
pub mod entity;
pub mod id;
pub mod session;
pub mod status;

pub use auth::{AuthMethod, AuthUser, Credentials, Identity, ParseAuthMethodError};
pub use email::{Email, EmailError};
pub use entity::{Attributes, Entity, Product, User};
pub use id::*;
pub use session::{CartKey, SessionId};
pub use status::AuthPhase;
