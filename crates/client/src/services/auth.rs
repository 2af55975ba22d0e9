//! Identity and session reconciliation.
//!
//! # Transitions
//!
//! ```text
//! Anonymous ──login/signup──▶ Authenticating ──ok──▶ Authenticated
//!     ▲                             │ err                 │
//!     │                             ▼                     │ logout
//!     │                      (back to settled)            ▼
//!     └──────────────ok────────────────────────────── LoggingOut
//!                                                         │ err
//!                                                         ▼
//!                                                   Authenticated
//! ```
//!
//! After every transition that changes the cart key, the cart is requested
//! exactly once, keyed from the store *after* the change was dispatched.

use tracing::{info, instrument};

use shopper_core::{AuthMethod, Credentials, Identity};

use super::Context;
use crate::api::Transport;
use crate::store::Action;

/// Orchestrators for the signed-in identity and the anonymous session.
pub struct AuthService<'a, T> {
    ctx: &'a Context<T>,
}

impl<'a, T: Transport> AuthService<'a, T> {
    #[must_use]
    pub const fn new(ctx: &'a Context<T>) -> Self {
        Self { ctx }
    }

    /// Look up an existing identity and the current session, then fetch
    /// the cart with whichever key is authoritative.
    ///
    /// Both lookups run concurrently and the cart request waits for both. A
    /// failed identity lookup is reported and leaves the identity as it was,
    /// so the client degrades to the session key.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) {
        let api = self.ctx.api();
        let (identity, session_id) = tokio::join!(api.me(), api.session_id());

        match identity {
            Ok(identity) => {
                info!(authenticated = identity.is_authenticated(), "Identity resolved");
                self.ctx.store().dispatch(Action::IdentitySet(identity));
            }
            Err(e) => self.ctx.report_failure("probing identity", &e),
        }

        match session_id {
            Ok(session_id) => self.ctx.store().dispatch(Action::SessionSet(session_id)),
            Err(e) => self.ctx.report_failure("probing session", &e),
        }

        self.ctx.request_cart();
    }

    /// Sign in with existing credentials.
    pub async fn login(&self, credentials: &Credentials) {
        self.authenticate(AuthMethod::Login, credentials).await;
    }

    /// Create an account and sign in.
    pub async fn signup(&self, credentials: &Credentials) {
        self.authenticate(AuthMethod::Signup, credentials).await;
    }

    /// Submit credentials to the endpoint for `method`.
    ///
    /// On success the identity is replaced with the server's user, the cart
    /// is re-requested under the user's id and the client navigates home. On
    /// failure the error is reported and the identity is left untouched.
    #[instrument(skip(self, credentials), fields(method = %method, email = %credentials.email))]
    pub async fn authenticate(&self, method: AuthMethod, credentials: &Credentials) {
        let store = self.ctx.store();
        store.dispatch(Action::AuthRequested);

        match self.ctx.api().authenticate(method, credentials).await {
            Ok(user) => {
                info!(user_id = %user.id, "Signed in");
                store.dispatch(Action::IdentitySet(Identity::User(user)));
                self.ctx.request_cart();
                self.ctx.navigate_to(&self.ctx.routes().home);
            }
            Err(e) => {
                store.dispatch(Action::AuthFailed);
                self.ctx.report_failure(method.display_name(), &e);
            }
        }
    }

    /// End the session.
    ///
    /// On success: clear the identity, navigate to the login route, then
    /// re-request the session and fetch its cart. The cart is never requested
    /// before the identity is cleared, and stays unkeyed if that request
    /// fails. On failure the identity stays as it was and the error is
    /// reported.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let store = self.ctx.store();
        store.dispatch(Action::LogoutRequested);

        if let Err(e) = self.ctx.api().logout().await {
            store.dispatch(Action::AuthFailed);
            self.ctx.report_failure("logging out", &e);
            return;
        }

        info!("Signed out");
        store.dispatch(Action::IdentityCleared);
        self.ctx.navigate_to(&self.ctx.routes().login);

        match self.ctx.api().session_id().await {
            Ok(session_id) => {
                store.dispatch(Action::SessionSet(session_id));
                self.ctx.request_cart();
            }
            Err(e) => self.ctx.report_failure("probing session after logout", &e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use reqwest::{Method, StatusCode};
    use secrecy::SecretString;
    use serde_json::json;
    use shopper_core::{AuthPhase, AuthUser, CartKey, Email, SessionId, UserId};

    use super::*;
    use crate::api::ApiResponse;
    use crate::collaborators::CartFetcher;
    use crate::store::{State, Store};
    use crate::testing::Harness;

    fn credentials() -> Credentials {
        Credentials::new(Email::parse("a@b.com").unwrap(), SecretString::from("x"))
    }

    fn user(id: i32) -> Identity {
        Identity::User(AuthUser::new(UserId::new(id), Some(Email::parse("a@b.com").unwrap())))
    }

    fn signed_in_state() -> State {
        State {
            identity: user(7),
            session_id: Some(SessionId::new("sess-1")),
            auth_phase: AuthPhase::Authenticated,
            cart_key: Some(CartKey::User(UserId::new(7))),
            ..State::default()
        }
    }

    /// Records each cart key together with whether an identity was still
    /// present in the store when the fetch was issued.
    struct SpyCart {
        store: Store,
        calls: Mutex<Vec<(CartKey, bool)>>,
    }

    impl CartFetcher for SpyCart {
        fn fetch_cart(&self, key: CartKey) {
            let authenticated = self.store.read(|s| s.identity.is_authenticated());
            self.calls.lock().unwrap().push((key, authenticated));
        }
    }

    #[tokio::test]
    async fn test_login_sets_identity_fetches_cart_and_navigates_home() {
        let harness = Harness::new();
        harness.transport.respond(
            Method::POST,
            "/auth/login",
            ApiResponse::json(&json!({ "id": 7, "email": "a@b.com" })),
        );

        harness.ctx.auth().login(&credentials()).await;

        let state = harness.ctx.store().snapshot();
        assert_eq!(state.identity, user(7));
        assert_eq!(state.auth_phase, AuthPhase::Authenticated);
        assert_eq!(harness.carts.keys(), vec![CartKey::User(UserId::new(7))]);
        assert_eq!(state.cart_key, Some(CartKey::User(UserId::new(7))));
        assert_eq!(harness.history.entries(), vec!["/home"]);
        assert!(harness.errors.is_empty());
        assert_eq!(
            harness.transport.requests()[0].body,
            Some(json!({ "email": "a@b.com", "password": "x" }))
        );
    }

    #[tokio::test]
    async fn test_signup_shares_orchestration_with_its_own_endpoint() {
        let harness = Harness::new();
        harness.transport.respond(
            Method::POST,
            "/auth/signup",
            ApiResponse::json(&json!({ "id": 8, "email": "a@b.com" })),
        );

        harness.ctx.auth().signup(&credentials()).await;

        assert_eq!(harness.transport.request_lines(), vec!["POST /auth/signup"]);
        assert_eq!(harness.ctx.store().snapshot().identity, user(8));
        assert_eq!(harness.history.current().as_deref(), Some("/home"));
    }

    #[tokio::test]
    async fn test_failed_login_leaves_identity_anonymous() {
        let harness = Harness::new();
        harness.transport.respond(
            Method::POST,
            "/auth/login",
            ApiResponse::new(StatusCode::UNAUTHORIZED, "Wrong username and/or password"),
        );

        harness.ctx.auth().login(&credentials()).await;

        let state = harness.ctx.store().snapshot();
        assert_eq!(state.identity, Identity::Anonymous);
        assert_eq!(state.auth_phase, AuthPhase::Anonymous);
        assert_eq!(harness.errors.messages(), vec!["Unauthorized"]);
        assert!(harness.carts.keys().is_empty());
        assert!(harness.history.entries().is_empty());
    }

    #[tokio::test]
    async fn test_login_response_without_identity_is_a_failure() {
        let harness = Harness::new();
        harness
            .transport
            .respond(Method::POST, "/auth/login", ApiResponse::json(&json!({})));

        harness.ctx.auth().login(&credentials()).await;

        assert_eq!(harness.ctx.store().snapshot().identity, Identity::Anonymous);
        assert_eq!(harness.errors.messages(), vec!["Operation failed"]);
    }

    #[tokio::test]
    async fn test_phase_is_authenticating_while_login_in_flight() {
        let harness = Harness::new();
        let gate = harness.transport.gate(Method::POST, "/auth/login");
        harness.transport.respond(
            Method::POST,
            "/auth/login",
            ApiResponse::json(&json!({ "id": 7 })),
        );

        let auth = harness.ctx.auth();
        let credentials = credentials();
        let observe = async {
            let phase = harness.ctx.store().read(|s| s.auth_phase);
            gate.notify_one();
            phase
        };
        let ((), during) = tokio::join!(auth.login(&credentials), observe);

        assert_eq!(during, AuthPhase::Authenticating);
        assert_eq!(
            harness.ctx.store().read(|s| s.auth_phase),
            AuthPhase::Authenticated
        );
    }

    #[tokio::test]
    async fn test_bootstrap_anonymous_uses_session_key() {
        let harness = Harness::new();
        harness
            .transport
            .respond(Method::GET, "/auth/me", ApiResponse::new(StatusCode::OK, ""));
        harness.transport.respond(
            Method::GET,
            "/auth/sessionId",
            ApiResponse::new(StatusCode::OK, "sess-1"),
        );

        harness.ctx.auth().bootstrap().await;

        let state = harness.ctx.store().snapshot();
        assert_eq!(state.identity, Identity::Anonymous);
        assert_eq!(state.session_id, Some(SessionId::new("sess-1")));
        assert_eq!(
            harness.carts.keys(),
            vec![CartKey::Session(SessionId::new("sess-1"))]
        );
        assert!(harness.errors.is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_signed_in_uses_identity_key() {
        let harness = Harness::new();
        harness.transport.respond(
            Method::GET,
            "/auth/me",
            ApiResponse::json(&json!({ "id": 7, "email": "a@b.com" })),
        );
        harness.transport.respond(
            Method::GET,
            "/auth/sessionId",
            ApiResponse::new(StatusCode::OK, "sess-1"),
        );

        harness.ctx.auth().bootstrap().await;

        let state = harness.ctx.store().snapshot();
        assert_eq!(state.identity, user(7));
        assert_eq!(state.auth_phase, AuthPhase::Authenticated);
        assert_eq!(state.session_id, Some(SessionId::new("sess-1")));
        assert_eq!(harness.carts.keys(), vec![CartKey::User(UserId::new(7))]);
    }

    #[tokio::test]
    async fn test_bootstrap_waits_for_both_lookups_before_cart() {
        let harness = Harness::new();
        let gate = harness.transport.gate(Method::GET, "/auth/sessionId");
        harness
            .transport
            .respond(Method::GET, "/auth/me", ApiResponse::new(StatusCode::OK, "null"));
        harness.transport.respond(
            Method::GET,
            "/auth/sessionId",
            ApiResponse::new(StatusCode::OK, "sess-9"),
        );

        let auth = harness.ctx.auth();
        let observe = async {
            tokio::task::yield_now().await;
            let carts_before = harness.carts.keys().len();
            gate.notify_one();
            carts_before
        };
        let ((), carts_before) = tokio::join!(auth.bootstrap(), observe);

        assert_eq!(carts_before, 0);
        assert_eq!(
            harness.carts.keys(),
            vec![CartKey::Session(SessionId::new("sess-9"))]
        );
    }

    #[tokio::test]
    async fn test_bootstrap_identity_lookup_failure_degrades_to_session() {
        let harness = Harness::new();
        harness.transport.respond(
            Method::GET,
            "/auth/me",
            ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, ""),
        );
        harness.transport.respond(
            Method::GET,
            "/auth/sessionId",
            ApiResponse::new(StatusCode::OK, "sess-1"),
        );

        harness.ctx.auth().bootstrap().await;

        let state = harness.ctx.store().snapshot();
        assert_eq!(state.identity, Identity::Anonymous);
        assert_eq!(state.session_id, Some(SessionId::new("sess-1")));
        assert_eq!(
            harness.carts.keys(),
            vec![CartKey::Session(SessionId::new("sess-1"))]
        );
        assert_eq!(harness.errors.messages(), vec!["Internal Server Error"]);
    }

    #[tokio::test]
    async fn test_bootstrap_without_any_key_skips_cart() {
        let harness = Harness::new();
        harness.transport.fail(Method::GET, "/auth/me");
        harness.transport.fail(Method::GET, "/auth/sessionId");

        harness.ctx.auth().bootstrap().await;

        assert!(harness.carts.keys().is_empty());
        assert_eq!(harness.ctx.store().snapshot().cart_key, None);
        assert_eq!(harness.errors.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_logout_refetches_cart_with_post_logout_session() {
        let harness = Harness::with_state(signed_in_state());
        let spy = Arc::new(SpyCart {
            store: harness.ctx.store().clone(),
            calls: Mutex::new(Vec::new()),
        });
        let ctx = Context::new(
            crate::api::ApiClient::new(harness.transport.clone()),
            harness.ctx.store().clone(),
        )
        .with_navigator(Arc::new(harness.history.clone()))
        .with_errors(Arc::new(harness.errors.clone()))
        .with_cart(spy.clone());
        harness
            .transport
            .respond(Method::POST, "/auth/logout", ApiResponse::new(StatusCode::OK, ""));
        harness.transport.respond(
            Method::GET,
            "/auth/sessionId",
            ApiResponse::new(StatusCode::OK, "sess-2"),
        );

        ctx.auth().logout().await;

        let state = ctx.store().snapshot();
        assert_eq!(state.identity, Identity::Anonymous);
        assert_eq!(state.auth_phase, AuthPhase::Anonymous);
        assert_eq!(state.session_id, Some(SessionId::new("sess-2")));
        assert_eq!(state.cart_key, Some(CartKey::Session(SessionId::new("sess-2"))));
        assert_eq!(
            *spy.calls.lock().unwrap(),
            vec![(CartKey::Session(SessionId::new("sess-2")), false)]
        );
        assert_eq!(harness.history.entries(), vec!["/login"]);
        assert_eq!(
            harness.transport.request_lines(),
            vec!["POST /auth/logout", "GET /auth/sessionId"]
        );
        assert!(harness.errors.is_empty());
    }

    #[tokio::test]
    async fn test_failed_logout_keeps_identity() {
        let harness = Harness::with_state(signed_in_state());
        harness.transport.respond(
            Method::POST,
            "/auth/logout",
            ApiResponse::new(StatusCode::BAD_GATEWAY, ""),
        );

        harness.ctx.auth().logout().await;

        let state = harness.ctx.store().snapshot();
        assert_eq!(state.identity, user(7));
        assert_eq!(state.auth_phase, AuthPhase::Authenticated);
        assert_eq!(harness.errors.messages(), vec!["Bad Gateway"]);
        assert!(harness.carts.keys().is_empty());
        assert!(harness.history.entries().is_empty());
        assert_eq!(harness.transport.request_lines(), vec!["POST /auth/logout"]);
    }

    #[tokio::test]
    async fn test_logout_with_failed_session_request_skips_cart() {
        let harness = Harness::with_state(signed_in_state());
        harness
            .transport
            .respond(Method::POST, "/auth/logout", ApiResponse::new(StatusCode::OK, ""));
        harness.transport.fail(Method::GET, "/auth/sessionId");

        harness.ctx.auth().logout().await;

        let state = harness.ctx.store().snapshot();
        assert_eq!(state.identity, Identity::Anonymous);
        assert_eq!(state.cart_key, None);
        assert!(harness.carts.keys().is_empty());
        assert_eq!(harness.history.entries(), vec!["/login"]);
        assert_eq!(harness.errors.messages(), vec!["Operation failed"]);
    }
}
