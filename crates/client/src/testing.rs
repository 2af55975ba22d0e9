//! Test doubles shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Method;
use tokio::sync::Notify;

use crate::api::{ApiClient, ApiRequest, ApiResponse, Transport};
use crate::collaborators::{CartLog, ErrorLog, History};
use crate::error::TransportError;
use crate::services::Context;
use crate::store::{State, Store};

type Route = (Method, String);

/// A transport that answers from a per-route queue of canned responses.
///
/// Unscripted requests fail with a network error. A gated route holds its
/// response until the returned `Notify` is signalled, which lets a test look
/// at the store while the request is still in flight.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    responses: HashMap<Route, VecDeque<Result<ApiResponse, TransportError>>>,
    gates: HashMap<Route, Arc<Notify>>,
    requests: Vec<ApiRequest>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method path`.
    pub fn respond(&self, method: Method, path: &str, response: ApiResponse) {
        self.push(method, path, Ok(response));
    }

    /// Queue a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: &str) {
        self.push(
            method,
            path,
            Err(TransportError::Network("connection reset".to_string())),
        );
    }

    /// Hold responses for `method path` until the returned handle is notified.
    pub fn gate(&self, method: Method, path: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.lock()
            .gates
            .insert((method, path.to_string()), Arc::clone(&notify));
        notify
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// `METHOD path` of every request sent so far, in order.
    pub fn request_lines(&self) -> Vec<String> {
        self.lock().requests.iter().map(ToString::to_string).collect()
    }

    fn push(&self, method: Method, path: &str, response: Result<ApiResponse, TransportError>) {
        self.lock()
            .responses
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let route = (request.method.clone(), request.path.clone());
        let gate = {
            let mut script = self.lock();
            script.requests.push(request);
            script.gates.get(&route).cloned()
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.lock()
            .responses
            .get_mut(&route)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::Network(format!(
                    "no scripted response for {} {}",
                    route.0, route.1
                )))
            })
    }
}

/// A context wired to a scripted transport and in-memory collaborators,
/// with handles kept for assertions.
pub struct Harness {
    pub transport: ScriptedTransport,
    pub errors: ErrorLog,
    pub history: History,
    pub carts: CartLog,
    pub ctx: Context<ScriptedTransport>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_state(State::default())
    }

    pub fn with_state(state: State) -> Self {
        let transport = ScriptedTransport::new();
        let errors = ErrorLog::new();
        let history = History::new();
        let carts = CartLog::new();

        let ctx = Context::new(ApiClient::new(transport.clone()), Store::with_state(state))
            .with_errors(Arc::new(errors.clone()))
            .with_navigator(Arc::new(history.clone()))
            .with_cart(Arc::new(carts.clone()));

        Self {
            transport,
            errors,
            history,
            carts,
            ctx,
        }
    }
}
