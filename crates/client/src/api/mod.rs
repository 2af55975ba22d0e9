//! Typed access to the backend's REST endpoints.
//!
//! # Architecture
//!
//! - [`Transport`] is the seam to the network: one request in, one response
//!   out. [`HttpTransport`] implements it with `reqwest`; tests script it.
//! - [`ApiClient`] maps each endpoint to a typed call and converts
//!   non-success statuses and bad bodies into [`ApiError`].
//!
//! # Endpoints
//!
//! | Call | Request |
//! |------|---------|
//! | [`ApiClient::me`] | `GET /auth/me` |
//! | [`ApiClient::session_id`] | `GET /auth/sessionId` |
//! | [`ApiClient::authenticate`] | `POST /auth/{login,signup}` |
//! | [`ApiClient::logout`] | `POST /auth/logout` |
//! | [`ApiClient::list`] | `GET {collection}` |
//! | [`ApiClient::create`] | `POST {collection}` |
//! | [`ApiClient::update`] | `PUT {collection}/{id}` |
//! | [`ApiClient::delete`] | `DELETE {collection}/{id}` |

mod http;

pub use http::HttpTransport;

use std::fmt;
use std::future::Future;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use shopper_core::{Attributes, AuthMethod, AuthUser, Credentials, Identity, SessionId};

use crate::error::{ApiError, TransportError};

/// Collection path for products.
pub const PRODUCTS_PATH: &str = "/api/products";

/// Collection path for the admin user listing.
pub const ADMIN_USERS_PATH: &str = "/api/admin/users";

/// A single request to the backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidRequest` if the body cannot be
    /// serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, TransportError> {
        let value = serde_json::to_value(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A response as seen by the client: status, reason phrase and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub status_text: Option<String>,
    pub body: String,
}

impl ApiResponse {
    /// A response with the status's canonical reason phrase.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().map(str::to_owned),
            body: body.into(),
        }
    }

    /// A `200 OK` carrying the given JSON value.
    #[must_use]
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(StatusCode::OK, value.to_string())
    }
}

/// Sends requests to the backend.
///
/// Implementations must not interpret statuses; a 4xx/5xx is still `Ok`.
pub trait Transport: Send + Sync {
    /// Send one request and wait for its response.
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

/// Typed client for the backend's auth and entity endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    /// Create a client over the given transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get a reference to the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the signed-in identity, or the anonymous sentinel.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that carries an `id` but is not a valid identity.
    pub async fn me(&self) -> Result<Identity, ApiError> {
        let body = self.execute(ApiRequest::get("/auth/me")).await?;
        Ok(Identity::from_body(&body)?)
    }

    /// Fetch the session identifier the server assigned to this client.
    ///
    /// Accepts both a bare string body and a JSON string literal.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub async fn session_id(&self) -> Result<SessionId, ApiError> {
        let body = self.execute(ApiRequest::get("/auth/sessionId")).await?;
        let body = body.trim();
        let id = serde_json::from_str::<String>(body).unwrap_or_else(|_| body.to_owned());
        Ok(SessionId::new(id))
    }

    /// Submit credentials to `/auth/{method}` and return the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that is not an identity with an `id`.
    pub async fn authenticate(
        &self,
        method: AuthMethod,
        credentials: &Credentials,
    ) -> Result<AuthUser, ApiError> {
        let request = ApiRequest::post(format!("/auth/{}", method.path_segment())).json(credentials)?;
        let body = self.execute(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// End the server-side session.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute(ApiRequest::post("/auth/logout")).await?;
        Ok(())
    }

    /// List every record of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that is not an array of records.
    pub async fn list<E: DeserializeOwned>(&self, path: &str) -> Result<Vec<E>, ApiError> {
        let body = self.execute(ApiRequest::get(path)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Create a record and return the server's representation of it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that is not a record.
    pub async fn create<E: DeserializeOwned>(
        &self,
        path: &str,
        attributes: &Attributes,
    ) -> Result<E, ApiError> {
        let body = self.execute(ApiRequest::post(path).json(attributes)?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Update a record and return the server's representation of it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that is not a record.
    pub async fn update<E: DeserializeOwned>(
        &self,
        path: &str,
        id: impl fmt::Display,
        attributes: &Attributes,
    ) -> Result<E, ApiError> {
        let request = ApiRequest::put(format!("{path}/{id}")).json(attributes)?;
        let body = self.execute(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub async fn delete(&self, path: &str, id: impl fmt::Display) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(format!("{path}/{id}"))).await?;
        Ok(())
    }

    /// Send a request and return the body of a success response.
    async fn execute(&self, request: ApiRequest) -> Result<String, ApiError> {
        let target = request.to_string();

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(request = %target, error = %e, "Request did not reach the server");
            ApiError::Transport(e)
        })?;

        if !response.status.is_success() {
            debug!(
                request = %target,
                status = %response.status,
                body = %response.body.chars().take(200).collect::<String>(),
                "Server rejected request"
            );
            return Err(ApiError::Status {
                status: response.status,
                status_text: response.status_text,
            });
        }

        debug!(request = %target, status = %response.status, "Request succeeded");
        Ok(response.body)
    }
}
