//! Shopper Client - state synchronization with the REST backend.
//!
//! Keeps a local mirror of the backend's products, admin users, identity and
//! session, and turns user intents into requests against the backend.
//!
//! # Architecture
//!
//! - [`store`] - the single authoritative [`State`], changed only by
//!   dispatching [`Action`]s through pure reducers
//! - [`api`] - typed endpoint calls over a pluggable [`Transport`]
//! - [`services`] - orchestrators that sequence requests and dispatches
//!   (optimistic removal, confirm-then-apply writes, auth reconciliation)
//! - [`collaborators`] - error channel, navigation and cart fetching
//! - [`config`] - environment configuration
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ClientConfig::from_env()?;
//! let ctx = Context::connect(&config)?;
//!
//! ctx.auth().bootstrap().await;
//! ctx.products().fetch_all().await;
//! println!("{:?}", ctx.store().snapshot());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod services;
pub mod store;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiRequest, ApiResponse, HttpTransport, Transport};
pub use collaborators::{
    CartFetcher, CartLog, ErrorChannel, ErrorLog, History, Navigator, Routes,
};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, GENERIC_FAILURE, TransportError};
pub use services::{AdminUserService, AuthService, Context, EntityService, ProductService};
pub use store::{Action, Collection, EntityAction, State, Store};
