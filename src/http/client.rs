//! Authenticated HTTP client with transparent token refresh
//!
//! Wraps the generic HTTP verbs with two responsibilities:
//! - Attach the stored bearer credential to every outgoing request
//! - On a 401, acquire a new credential at most once across all concurrent
//!   requests, then replay each failed request with the fresh token
//!
//! Non-401 failures (4xx/5xx, network errors, timeouts) propagate to the
//! caller unmodified; nothing here retries them.

use super::refresh::{RefreshCoordinator, RefreshEntry, RefreshOutcome};
use super::session::{SessionEvent, SessionHub};
use crate::credentials::{CredentialStore, MemoryCredentialStore, TokenPair};
use crate::error::{Error, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use url::Url;

/// Path of the credential refresh endpoint
const REFRESH_PATH: &str = "/auth/refresh-token";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the Taskdeck API
    pub base_url: String,
    /// Request timeout (fixed budget per call)
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl ApiClientConfig {
    /// Create a config with defaults for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            default_headers: HashMap::new(),
            user_agent: format!("taskdeck-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Create a new config builder
    pub fn builder(base_url: impl Into<String>) -> ApiClientConfigBuilder {
        ApiClientConfigBuilder {
            config: Self::new(base_url),
        }
    }
}

/// Builder for API client config
pub struct ApiClientConfigBuilder {
    config: ApiClientConfig,
}

impl ApiClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ApiClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Authenticated HTTP client for the Taskdeck API
///
/// Cheap to clone; clones share the credential store, the refresh gate, and
/// the session channel, so the single-flight guarantee holds across clones.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    config: ApiClientConfig,
    store: Arc<dyn CredentialStore>,
    refresh: RefreshCoordinator,
    session: SessionHub,
}

impl ApiClient {
    /// Create a client with an in-memory credential store
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(
            ApiClientConfig::new(base_url),
            Arc::new(MemoryCredentialStore::new()),
        )
    }

    /// Create a client with custom configuration and credential store
    pub fn with_config(config: ApiClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Url::parse(&config.base_url)?;

        let inner = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            inner,
            config,
            store,
            refresh: RefreshCoordinator::new(),
            session: SessionHub::new(),
        })
    }

    /// The credential store backing this client
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Store a freshly issued token pair (after login or registration)
    pub async fn set_tokens(&self, tokens: TokenPair) -> Result<()> {
        self.store.set_tokens(tokens).await
    }

    /// Drop the stored token pair (logout)
    pub async fn clear_tokens(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Subscribe to session lifecycle events
    ///
    /// The embedding application should route to its login entry point when
    /// it receives [`SessionEvent::Invalidated`].
    pub fn subscribe_session(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    /// Make a GET request and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, RequestConfig::default())
            .await
    }

    /// Make a GET request with config and decode the JSON response
    pub async fn get_with_config<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        self.request_json(Method::GET, path, config).await
    }

    /// Make a POST request and decode the JSON response
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.request_json(Method::POST, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a PUT request and decode the JSON response
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.request_json(Method::PUT, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a PATCH request and decode the JSON response
    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.request_json(Method::PATCH, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a DELETE request, discarding any response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, RequestConfig::default())
            .await?;
        Ok(())
    }

    /// Make a request and parse the JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.request(method, path, config).await?;
        let json: T = response.json().await.map_err(Error::Http)?;
        Ok(json)
    }

    /// Make a generic request, running the refresh protocol on a 401
    ///
    /// Returns the raw response for any 2xx status; non-2xx statuses are
    /// mapped to errors. A request is replayed at most once, so a second 401
    /// on the same call never starts another refresh.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let url = self.build_url(path);
        let token = self.store.access_token().await?;
        let response = self
            .dispatch(method.clone(), &url, &config, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::into_checked(response).await;
        }

        debug!(%method, url, "request unauthorized, entering refresh protocol");
        let token = self.refreshed_access_token().await?;

        let response = self.dispatch(method, &url, &config, Some(&token)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url, "request still unauthorized after token refresh");
            return Err(Error::Unauthorized);
        }
        Self::into_checked(response).await
    }

    // ========================================================================
    // Refresh protocol
    // ========================================================================

    /// Obtain the access token to replay with, refreshing at most once
    ///
    /// The first caller becomes the leader and performs the refresh; callers
    /// arriving while the cycle is open park on the queue and receive the
    /// same outcome.
    async fn refreshed_access_token(&self) -> Result<String> {
        match self.refresh.join() {
            RefreshEntry::Follower(rx) => match rx.await {
                Ok(Ok(token)) => Ok(token),
                Ok(Err(message)) => Err(Error::SessionExpired { message }),
                Err(_) => Err(Error::session_expired("refresh cycle dropped")),
            },
            RefreshEntry::Leader(permit) => {
                let outcome = self.run_refresh_cycle().await;
                permit.settle(&outcome);
                match outcome {
                    Ok(token) => Ok(token),
                    Err(message) => Err(Error::SessionExpired { message }),
                }
            }
        }
    }

    /// Exchange the refresh token and persist the new pair
    ///
    /// Any failure voids the session: credentials are cleared and the
    /// invalidation event is published before the outcome fans out.
    async fn run_refresh_cycle(&self) -> RefreshOutcome {
        match self.exchange_refresh_token().await {
            Ok(pair) => {
                let access = pair.access_token.clone();
                match self.store.set_tokens(pair).await {
                    Ok(()) => {
                        debug!("token refresh succeeded");
                        Ok(access)
                    }
                    Err(err) => {
                        self.void_session(&err).await;
                        Err(err.to_string())
                    }
                }
            }
            Err(err) => {
                self.void_session(&err).await;
                Err(err.to_string())
            }
        }
    }

    /// Call the refresh endpoint with the stored refresh token
    async fn exchange_refresh_token(&self) -> Result<TokenPair> {
        let refresh_token = self
            .store
            .refresh_token()
            .await?
            .ok_or(Error::MissingRefreshToken)?;

        let url = self.build_url(REFRESH_PATH);
        let response = self
            .inner
            .post(&url)
            .timeout(self.config.timeout)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::token_refresh(format!(
                "refresh endpoint returned {}: {body}",
                status.as_u16()
            )));
        }

        let pair: TokenPair = response.json().await.map_err(Error::Http)?;
        Ok(pair)
    }

    async fn void_session(&self, cause: &Error) {
        warn!(%cause, "token refresh failed, session invalidated");
        if let Err(err) = self.store.clear().await {
            warn!(%err, "failed to clear credentials");
        }
        self.session.invalidate();
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Build and send one request; no retries at this layer
    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        config: &RequestConfig,
        bearer: Option<&str>,
    ) -> Result<Response> {
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut req = self.inner.request(method, url).timeout(timeout);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(body) = &config.body {
            req = req.json(body);
        }
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })
    }

    /// Map non-2xx statuses to errors, passing 2xx responses through
    async fn into_checked(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("refresh_in_progress", &self.refresh.in_progress())
            .finish_non_exhaustive()
    }
}
