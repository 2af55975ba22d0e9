//! `reqwest`-backed transport.

use std::sync::Arc;

use tracing::{instrument, trace};
use url::Url;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::TransportError;

/// HTTP transport for a backend at a fixed base URL.
///
/// Keeps a cookie store so the session cookie set by `/auth/*` is sent on
/// every later request, the way a browser would.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

struct HttpTransportInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport for the backend at `base_url`.
    ///
    /// Request paths are resolved under the base URL's path, so
    /// `https://shop.example/store` + `/api/products` becomes
    /// `https://shop.example/store/api/products`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidRequest` if the HTTP client cannot be
    /// built.
    pub fn new(base_url: &Url) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(HttpTransportInner { client, base_url }),
        })
    }

    /// The normalized base URL (always ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidRequest(format!("{path}: {e}")))
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.resolve(&request.path)?;

        let mut builder = self.inner.client.request(request.method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        trace!(status = %status, bytes = body.len(), "Response received");

        Ok(ApiResponse {
            status,
            status_text: status.canonical_reason().map(str::to_owned),
            body,
        })
    }
}
