//! Collaborators the services talk to but do not own.
//!
//! Each is a small synchronous trait with an in-memory implementation that a
//! UI shell can read from (and tests assert against).

mod cart;
mod error_channel;
mod navigation;

pub use cart::{CartFetcher, CartLog};
pub use error_channel::{ErrorChannel, ErrorLog};
pub use navigation::{History, Navigator, Routes};
