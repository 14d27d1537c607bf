//! Transport trait and the HTTP implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::ApiError;

/// Sends request envelopes to the API and returns raw response bodies.
///
/// The client builds every envelope and parses every response itself; a
/// transport only moves bytes. Implement it to route requests through a
/// proxy layer or to script responses in tests.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use openair_lib::Transport;
/// use openair_lib::error::ApiError;
///
/// struct Canned(String);
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn send(&self, _body: String) -> Result<String, ApiError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request envelope and returns the response body.
    async fn send(&self, body: String) -> Result<String, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, body: String) -> Result<String, ApiError> {
        (**self).send(body).await
    }
}

/// A [`Transport`] that POSTs envelopes to the API endpoint with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport for the given endpoint.
    pub fn new(endpoint: Url, http_client: Client) -> Self {
        Self {
            endpoint,
            http_client,
            timeout: None,
        }
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: String) -> Result<String, ApiError> {
        let mut request = self
            .http_client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/xml")
            .body(body);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_error(e))?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(ApiError::http(status.as_u16(), text))
        }
    }
}

impl HttpTransport {
    fn map_error(&self, err: reqwest::Error) -> ApiError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(err),
        }
    }
}
