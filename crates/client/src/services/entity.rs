//! Collection orchestrators.
//!
//! Two write policies:
//! - Confirm-then-apply (`create`, `update`): the store only ever receives the
//!   server's representation of the record, including server-assigned ids
//!   and defaults. An update answered with a different record is reported and
//!   not applied.
//! - Optimistic (`remove`): the record leaves the store before the request is
//!   sent.

use std::marker::PhantomData;

use tracing::{info, instrument};

use shopper_core::{Attributes, Entity, Product, User};

use super::Context;
use crate::api::Transport;
use crate::error::ApiError;
use crate::store::{Collection, EntityAction};

/// Orchestrators for one entity collection.
pub struct EntityService<'a, T, E> {
    ctx: &'a Context<T>,
    _entity: PhantomData<E>,
}

/// Product collection orchestrators.
pub type ProductService<'a, T> = EntityService<'a, T, Product>;

/// Admin user collection orchestrators.
pub type AdminUserService<'a, T> = EntityService<'a, T, User>;

impl<'a, T: Transport, E: Collection> EntityService<'a, T, E> {
    #[must_use]
    pub const fn new(ctx: &'a Context<T>) -> Self {
        Self {
            ctx,
            _entity: PhantomData,
        }
    }

    /// Load the full collection and replace the local copy with it.
    #[instrument(skip(self), fields(collection = E::PATH))]
    pub async fn fetch_all(&self) {
        match self.ctx.api().list::<E>(E::PATH).await {
            Ok(items) => {
                info!(count = items.len(), "Collection loaded");
                self.ctx
                    .store()
                    .dispatch(E::action(EntityAction::Replaced(items)));
            }
            Err(e) => self.ctx.report_failure(&format!("fetching {}s", E::NOUN), &e),
        }
    }

    /// Update a record, then apply the server's version of it.
    ///
    /// An id no longer in the local collection is left alone: the reducer
    /// treats the update as a no-op.
    #[instrument(skip(self, attributes), fields(collection = E::PATH, id = %id))]
    pub async fn update(&self, id: E::Id, attributes: &Attributes) {
        match self.ctx.api().update::<E>(E::PATH, id, attributes).await {
            Ok(item) if item.id() != id => {
                let err = ApiError::IdMismatch {
                    requested: id.to_string(),
                    returned: item.id().to_string(),
                };
                self.ctx
                    .report_failure(&format!("updating {} {id}", E::NOUN), &err);
            }
            Ok(item) => {
                self.ctx
                    .store()
                    .dispatch(E::action(EntityAction::Updated(item)));
            }
            Err(e) => self
                .ctx
                .report_failure(&format!("updating {} {id}", E::NOUN), &e),
        }
    }

    /// Remove a record optimistically.
    ///
    /// The record is dropped from the store before the request is sent. If
    /// the server refuses, the failure is reported but the record is *not*
    /// restored; the next `fetch_all` brings back whatever the server still
    /// has.
    #[instrument(skip(self), fields(collection = E::PATH, id = %id))]
    pub async fn remove(&self, id: E::Id) {
        self.ctx
            .store()
            .dispatch(E::action(EntityAction::Removed(id)));

        if let Err(e) = self.ctx.api().delete(E::PATH, id).await {
            self.ctx
                .report_failure(&format!("removing {} {id}", E::NOUN), &e);
        }
    }
}

impl<T: Transport> EntityService<'_, T, Product> {
    /// Create a product, then prepend the server's version of it.
    #[instrument(skip(self, attributes), fields(collection = Product::PATH))]
    pub async fn create(&self, attributes: &Attributes) {
        match self.ctx.api().create::<Product>(Product::PATH, attributes).await {
            Ok(product) => {
                info!(id = %product.id(), "Product created");
                self.ctx
                    .store()
                    .dispatch(Product::action(EntityAction::Created(product)));
            }
            Err(e) => self.ctx.report_failure("creating product", &e),
        }
    }
}
