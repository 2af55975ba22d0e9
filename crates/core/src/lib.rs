//! Shopper Core - Shared domain types.
//!
//! This crate provides the types the Shopper client synchronizes with the
//! backend:
//! - Entity records (`Product`, `User`) identified by type-safe ids
//! - The current `Identity` (anonymous sentinel or a signed-in user)
//! - The anonymous `SessionId` and the derived `CartKey`
//! - Login/signup `Credentials`
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no async runtime. The client crate builds the store and orchestration on
//! top of it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers, entity records and auth types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
