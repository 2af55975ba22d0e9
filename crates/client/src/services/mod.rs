//! Orchestrating services.
//!
//! Services turn a UI intent into network requests and store dispatches:
//! - [`EntityService`] - product and admin-user collections
//! - [`AuthService`] - bootstrap, login/signup and logout
//!
//! Failures never escape a service. They are logged and forwarded to the
//! [`ErrorChannel`] as one user-facing message, and the service returns
//! normally. Every service future can be dropped to abandon it; a request
//! that already reached the server is not recalled.

mod auth;
mod entity;

pub use auth::AuthService;
pub use entity::{AdminUserService, EntityService, ProductService};

use std::sync::Arc;

use tracing::{info, warn};

use shopper_core::CartKey;

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::collaborators::{CartFetcher, CartLog, ErrorChannel, ErrorLog, History, Navigator, Routes};
use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError};
use crate::store::{Action, State, Store};

/// Everything a service needs: the store, the API and the collaborators.
pub struct Context<T> {
    store: Store,
    api: ApiClient<T>,
    errors: Arc<dyn ErrorChannel>,
    navigator: Arc<dyn Navigator>,
    cart: Arc<dyn CartFetcher>,
    routes: Routes,
}

impl<T> std::fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("store", &self.store)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl Context<HttpTransport> {
    /// Build a context talking HTTP to the configured backend.
    ///
    /// Collaborators default to the in-memory ones; replace them with the
    /// `with_*` methods.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.api_url)?;
        Ok(Self::new(ApiClient::new(transport), Store::new()).with_routes(config.routes.clone()))
    }
}

impl<T: Transport> Context<T> {
    /// Create a context with in-memory collaborators and default routes.
    #[must_use]
    pub fn new(api: ApiClient<T>, store: Store) -> Self {
        Self {
            store,
            api,
            errors: Arc::new(ErrorLog::new()),
            navigator: Arc::new(History::new()),
            cart: Arc::new(CartLog::new()),
            routes: Routes::default(),
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Arc<dyn ErrorChannel>) -> Self {
        self.errors = errors;
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    #[must_use]
    pub fn with_cart(mut self, cart: Arc<dyn CartFetcher>) -> Self {
        self.cart = cart;
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: Routes) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    #[must_use]
    pub const fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Product collection orchestrators.
    #[must_use]
    pub const fn products(&self) -> ProductService<'_, T> {
        EntityService::new(self)
    }

    /// Admin user collection orchestrators.
    #[must_use]
    pub const fn users(&self) -> AdminUserService<'_, T> {
        EntityService::new(self)
    }

    /// Identity and session orchestrators.
    #[must_use]
    pub const fn auth(&self) -> AuthService<'_, T> {
        AuthService::new(self)
    }

    /// Log a failed operation and forward its message to the error channel.
    pub(crate) fn report_failure(&self, operation: &str, err: &ApiError) {
        let message = err.user_message();
        warn!(operation, error = %err, message = %message, "Operation failed");
        self.errors.report(&message);
    }

    pub(crate) fn navigate_to(&self, path: &str) {
        self.navigator.navigate_to(path);
    }

    /// Fetch the cart with the key the store holds *now*.
    ///
    /// Callers dispatch their identity/session changes first, so the key is
    /// always the post-transition one. Skipped when neither an identity nor
    /// a session is known.
    pub(crate) fn request_cart(&self) -> Option<CartKey> {
        let Some(key) = self.store.read(State::authoritative_cart_key) else {
            warn!("No identity or session to key the cart by; skipping cart fetch");
            return None;
        };

        info!(key = %key, "Requesting cart");
        self.store.dispatch(Action::CartRequested(key.clone()));
        self.cart.fetch_cart(key.clone());
        Some(key)
    }
}
