//! End-to-end tests for the Shopper client.
//!
//! The tests run the real [`HttpTransport`](shopper_client::HttpTransport)
//! against [`MockBackend`], an in-process axum server that speaks the same
//! REST surface as the production backend:
//!
//! | Route | Behavior |
//! |-------|----------|
//! | `GET /auth/me` | current user, or `{}` |
//! | `GET /auth/sessionId` | session id as plain text |
//! | `POST /auth/login` | 401 on unknown email or wrong password |
//! | `POST /auth/signup` | 409 if the email is taken |
//! | `POST /auth/logout` | clears the user, rotates the session |
//! | `GET/POST /api/products`, `PUT/DELETE /api/products/{id}` | product CRUD |
//! | `GET /api/admin/users`, `PUT/DELETE /api/admin/users/{id}` | admin only |
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopper-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;
use url::Url;

use shopper_client::{
    CartLog, ClientConfig, Context, ErrorLog, History, HttpTransport, TransportError,
};

type Record = Map<String, Value>;
type SharedState = Arc<Mutex<BackendState>>;

#[derive(Default)]
struct BackendState {
    products: Vec<Record>,
    users: Vec<Record>,
    passwords: HashMap<String, String>,
    current_user: Option<i32>,
    session_seq: u32,
    next_id: i32,
    failures: HashMap<(Method, String), StatusCode>,
    requests: Vec<String>,
}

impl BackendState {
    fn session_id(&self) -> String {
        format!("sess-{}", self.session_seq)
    }

    const fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i32) -> Option<&Record> {
        self.users.iter().find(|u| record_id(u) == Some(id))
    }

    fn is_admin(&self) -> bool {
        self.current_user
            .and_then(|id| self.user(id))
            .and_then(|u| u.get("isAdmin"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn record_id(record: &Record) -> Option<i32> {
    record
        .get("id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

fn lock(state: &SharedState) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-process backend bound to an ephemeral localhost port.
///
/// The server task is aborted when the backend is dropped.
pub struct MockBackend {
    url: Url,
    state: SharedState,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend with no accounts, no products and session `sess-1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let state: SharedState = Arc::new(Mutex::new(BackendState {
            session_seq: 1,
            next_id: 100,
            ..BackendState::default()
        }));

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let app = router(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        Ok(Self { url, state, handle })
    }

    /// Base URL of the running backend.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Client configuration pointing at this backend with default routes.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_url(self.url.clone())
    }

    /// A client context over HTTP with in-memory collaborators, keeping
    /// handles to them for assertions.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self) -> Result<TestClient, TransportError> {
        let errors = ErrorLog::new();
        let history = History::new();
        let carts = CartLog::new();
        let ctx = Context::connect(&self.config())?
            .with_errors(Arc::new(errors.clone()))
            .with_navigator(Arc::new(history.clone()))
            .with_cart(Arc::new(carts.clone()));

        Ok(TestClient {
            ctx,
            errors,
            history,
            carts,
        })
    }

    /// Register an account and return its id.
    pub fn seed_account(&self, email: &str, password: &str, is_admin: bool) -> i32 {
        let mut state = lock(&self.state);
        let id = state.allocate_id();
        state.users.push(user_record(id, email, is_admin));
        state
            .passwords
            .insert(email.to_string(), password.to_string());
        id
    }

    /// Add a product with the given attributes and return its id.
    pub fn seed_product(&self, attributes: &Value) -> i32 {
        let mut state = lock(&self.state);
        let id = state.allocate_id();
        state.products.push(product_record(id, attributes));
        id
    }

    /// Make the next `method path` request answer with `status`.
    pub fn fail_next(&self, method: Method, path: &str, status: StatusCode) {
        lock(&self.state)
            .failures
            .insert((method, path.to_string()), status);
    }

    /// The session id the backend currently hands out.
    #[must_use]
    pub fn session_id(&self) -> String {
        lock(&self.state).session_id()
    }

    /// Id of the signed-in account, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<i32> {
        lock(&self.state).current_user
    }

    /// Ids of the products the backend holds, in order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<i32> {
        lock(&self.state).products.iter().filter_map(record_id).collect()
    }

    /// Ids of the accounts the backend holds, in order.
    #[must_use]
    pub fn user_ids(&self) -> Vec<i32> {
        lock(&self.state).users.iter().filter_map(record_id).collect()
    }

    /// `METHOD path` of every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }
}

/// A connected client plus the collaborators it reports to.
pub struct TestClient {
    pub ctx: Context<HttpTransport>,
    pub errors: ErrorLog,
    pub history: History,
    pub carts: CartLog,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn user_record(id: i32, email: &str, is_admin: bool) -> Record {
    let mut record = Record::new();
    record.insert("id".to_string(), json!(id));
    record.insert("email".to_string(), json!(email));
    record.insert("isAdmin".to_string(), json!(is_admin));
    record
}

fn product_record(id: i32, attributes: &Value) -> Record {
    let mut record = attributes.as_object().cloned().unwrap_or_default();
    record.entry("price").or_insert_with(|| json!("0.00"));
    record.insert("id".to_string(), json!(id));
    record
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/sessionId", get(session_id))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}", put(update_user).delete(delete_user))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            record_and_inject_failures,
        ))
        .with_state(state)
}

/// Log every request and answer scripted failures before routing.
async fn record_and_inject_failures(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let route = (request.method().clone(), request.uri().path().to_string());
    let failure = {
        let mut state = lock(&state);
        state.requests.push(format!("{} {}", route.0, route.1));
        state.failures.remove(&route)
    };

    match failure {
        Some(status) => status.into_response(),
        None => next.run(request).await,
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Deserialize)]
struct CredentialsBody {
    email: String,
    password: String,
}

async fn me(State(state): State<SharedState>) -> Json<Value> {
    let state = lock(&state);
    let user = state
        .current_user
        .and_then(|id| state.user(id))
        .map_or_else(|| json!({}), |u| Value::Object(u.clone()));
    Json(user)
}

async fn session_id(State(state): State<SharedState>) -> String {
    lock(&state).session_id()
}

async fn login(
    State(state): State<SharedState>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<Value>, StatusCode> {
    let mut state = lock(&state);
    if state.passwords.get(&body.email) != Some(&body.password) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .users
        .iter()
        .find(|u| u.get("email").and_then(Value::as_str) == Some(body.email.as_str()))
        .cloned()
        .ok_or(StatusCode::UNAUTHORIZED)?;
    state.current_user = record_id(&user);
    Ok(Json(Value::Object(user)))
}

async fn signup(
    State(state): State<SharedState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut state = lock(&state);
    if state.passwords.contains_key(&body.email) {
        return Err(StatusCode::CONFLICT);
    }

    let id = state.allocate_id();
    let user = user_record(id, &body.email, false);
    state.users.push(user.clone());
    state.passwords.insert(body.email, body.password);
    state.current_user = Some(id);
    Ok((StatusCode::CREATED, Json(Value::Object(user))))
}

async fn logout(State(state): State<SharedState>) -> StatusCode {
    let mut state = lock(&state);
    state.current_user = None;
    state.session_seq += 1;
    StatusCode::NO_CONTENT
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(state): State<SharedState>) -> Json<Vec<Record>> {
    Json(lock(&state).products.clone())
}

async fn create_product(
    State(state): State<SharedState>,
    Json(attributes): Json<Value>,
) -> (StatusCode, Json<Record>) {
    let mut state = lock(&state);
    let id = state.allocate_id();
    let record = product_record(id, &attributes);
    state.products.push(record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn update_product(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(attributes): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    let mut state = lock(&state);
    update_record(&mut state.products, id, attributes)
}

async fn delete_product(State(state): State<SharedState>, Path(id): Path<i32>) -> StatusCode {
    delete_record(&mut lock(&state).products, id)
}

// =============================================================================
// Admin users
// =============================================================================

async fn list_users(State(state): State<SharedState>) -> Result<Json<Vec<Record>>, StatusCode> {
    let state = lock(&state);
    if !state.is_admin() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(state.users.clone()))
}

async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(attributes): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    let mut state = lock(&state);
    if !state.is_admin() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    update_record(&mut state.users, id, attributes)
}

async fn delete_user(State(state): State<SharedState>, Path(id): Path<i32>) -> StatusCode {
    let mut state = lock(&state);
    if !state.is_admin() {
        return StatusCode::UNAUTHORIZED;
    }
    delete_record(&mut state.users, id)
}

fn update_record(records: &mut [Record], id: i32, attributes: Record) -> Result<Json<Record>, StatusCode> {
    let record = records
        .iter_mut()
        .find(|r| record_id(r) == Some(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    for (key, value) in attributes {
        if key != "id" {
            record.insert(key, value);
        }
    }
    Ok(Json(record.clone()))
}

fn delete_record(records: &mut Vec<Record>, id: i32) -> StatusCode {
    let before = records.len();
    records.retain(|r| record_id(r) != Some(id));
    if records.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}
