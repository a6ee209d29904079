//! Cached, self-refreshing access to the user and app tokens.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use secrecy::ExposeSecret;
use tokio::sync::{Mutex, RwLock};

use twitch_common::{
    AppToken, CredentialSource, Credentials, DEFAULT_EXPIRES_IN_SECS, REFRESH_MARGIN_SECS,
    TokenState, expiry_after,
};

use super::{
    AuthEndpoints, DEFAULT_TIMEOUT_SECS, TokenRefreshObserver, TokenResponse, ValidateResponse,
};
use crate::AccessTokenProvider;
use crate::error::ClientError;

/// Owns the user token pair and hands out tokens that are valid for at least
/// [`REFRESH_MARGIN_SECS`] more seconds.
///
/// All methods take `&self`; share one manager between tasks through an
/// [`Arc`]. Concurrent callers that find the token stale wait on a single
/// refresh instead of each issuing their own.
///
/// The HTTP transport is created on first use and released by
/// [`close`](Self::close). A closed manager reopens it on the next call.
pub struct TokenManager {
    credentials: Credentials,
    endpoints: AuthEndpoints,
    timeout: Duration,
    observer: Option<Arc<dyn TokenRefreshObserver>>,
    state: RwLock<Option<TokenState>>,
    app_token: RwLock<Option<AppToken>>,
    refresh_gate: Mutex<()>,
    app_gate: Mutex<()>,
    http: Mutex<Option<reqwest::Client>>,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("client_id", &self.credentials.client_id())
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Creates a manager that performs no I/O until the first token request.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoints: AuthEndpoints::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            observer: None,
            state: RwLock::new(None),
            app_token: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            app_gate: Mutex::new(()),
            http: Mutex::new(None),
        }
    }

    /// Creates a manager from credentials resolved by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConfigurationError`] if a required credential
    /// is missing.
    pub fn from_source(source: &dyn CredentialSource) -> Result<Self, ClientError> {
        Ok(Self::new(source.load()?))
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Registers a callback fired after each successful refresh.
    #[must_use]
    pub fn with_refresh_observer(mut self, observer: impl TokenRefreshObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Seeds the cache with a previously persisted state.
    ///
    /// The seeded state is trusted as-is and not validated; it is refreshed
    /// as soon as it comes within the refresh margin.
    #[must_use]
    pub fn with_token_state(mut self, state: TokenState) -> Self {
        self.state = RwLock::new(Some(state));
        self
    }

    pub fn client_id(&self) -> &str {
        self.credentials.client_id()
    }

    /// Returns an access token valid for at least the refresh margin.
    ///
    /// The first call validates the configured access token. Later calls
    /// return the cached token without I/O unless it is about to expire, in
    /// which case it is refreshed first.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthenticationError`] if validation fails for a reason
    ///   other than an invalid token
    /// - [`ClientError::TokenRefreshError`] if the provider rejects the refresh
    /// - [`ClientError::NetworkError`] on transport failure or timeout
    pub async fn get_token(&self) -> Result<String, ClientError> {
        if let Some(token) = self.fresh_access_token().await {
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited on the gate
        let current = self.state.read().await.clone();
        let state = match current {
            None => {
                let initial = self.initialize().await?;
                if initial.needs_refresh(Utc::now(), REFRESH_MARGIN_SECS) {
                    self.refresh_from(&initial).await?
                } else {
                    initial
                }
            }
            Some(state) if state.needs_refresh(Utc::now(), REFRESH_MARGIN_SECS) => {
                self.refresh_from(&state).await?
            }
            Some(state) => state,
        };

        Ok(state.access_token)
    }

    /// Forces a refresh of the user token, ignoring its remaining lifetime.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthenticationError`] if no token has been obtained yet
    /// - [`ClientError::TokenRefreshError`] if the provider rejects the refresh
    /// - [`ClientError::NetworkError`] on transport failure or timeout
    pub async fn refresh(&self) -> Result<TokenState, ClientError> {
        let _gate = self.refresh_gate.lock().await;

        let current = self.state.read().await.clone().ok_or_else(|| {
            ClientError::AuthenticationError("No token available to refresh".to_string())
        })?;

        self.refresh_from(&current).await
    }

    /// Ensures a valid token, then returns a snapshot of the full state.
    ///
    /// # Errors
    ///
    /// Same as [`get_token`](Self::get_token).
    pub async fn get_token_info(&self) -> Result<TokenState, ClientError> {
        self.get_token().await?;
        self.cached_token_state()
            .await
            .ok_or_else(|| ClientError::AuthenticationError("No token available".to_string()))
    }

    /// The current user token state, without any I/O.
    pub async fn cached_token_state(&self) -> Option<TokenState> {
        self.state.read().await.clone()
    }

    /// Returns an app access token from the client-credentials grant.
    ///
    /// App tokens are cached separately from the user token and follow the
    /// same refresh margin. Obtaining one never notifies the refresh observer.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthenticationError`] if the provider refuses the grant
    /// - [`ClientError::NetworkError`] on transport failure or timeout
    pub async fn get_app_token(&self) -> Result<String, ClientError> {
        if let Some(token) = self.fresh_app_token().await {
            return Ok(token);
        }

        let _gate = self.app_gate.lock().await;

        if let Some(token) = self.fresh_app_token().await {
            return Ok(token);
        }

        let token = self.request_app_token().await?;
        let access_token = token.access_token.clone();
        *self.app_token.write().await = Some(token);

        Ok(access_token)
    }

    /// Releases the HTTP transport. Safe to call more than once.
    pub async fn close(&self) {
        if self.http.lock().await.take().is_some() {
            debug!("Closed token manager HTTP client");
        }
    }

    async fn fresh_access_token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .filter(|state| !state.needs_refresh(Utc::now(), REFRESH_MARGIN_SECS))
            .map(|state| state.access_token.clone())
    }

    async fn fresh_app_token(&self) -> Option<String> {
        self.app_token
            .read()
            .await
            .as_ref()
            .filter(|token| !token.needs_refresh(Utc::now(), REFRESH_MARGIN_SECS))
            .map(|token| token.access_token.clone())
    }

    async fn http_client(&self) -> Result<reqwest::Client, ClientError> {
        let mut http = self.http.lock().await;
        if let Some(client) = http.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                ClientError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;
        *http = Some(client.clone());

        Ok(client)
    }

    /// Builds the initial state from credentials and validates it.
    ///
    /// Nothing is cached unless validation (or the refresh it falls back to)
    /// succeeds, so a failed first call is retried from scratch.
    async fn initialize(&self) -> Result<TokenState, ClientError> {
        debug!("Initializing token state for client {}", self.client_id());
        let initial = TokenState::from_credentials(&self.credentials);
        self.validate(&initial).await
    }

    async fn validate(&self, state: &TokenState) -> Result<TokenState, ClientError> {
        let http = self.http_client().await?;
        let response = http
            .get(&self.endpoints.validate_url)
            .header(AUTHORIZATION, format!("OAuth {}", state.access_token))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Access token rejected by validate endpoint, refreshing");
            return self.refresh_from(state).await;
        }

        let body = response.text().await?;
        if status != StatusCode::OK {
            error!("Token validation failed with status {}", status.as_u16());
            return Err(ClientError::AuthenticationError(format!(
                "Failed to validate token: {body}"
            )));
        }

        let validated: ValidateResponse = serde_json::from_str(&body)?;
        info!(
            "Validated access token for {} ({}), expires in {}s",
            validated.login.as_deref().unwrap_or("unknown user"),
            validated.user_id.as_deref().unwrap_or("-"),
            validated.expires_in
        );

        let expires_at = expiry_after(Utc::now(), validated.expires_in).ok_or_else(|| {
            ClientError::AuthenticationError(format!(
                "Validate endpoint returned out-of-range expires_in: {}",
                validated.expires_in
            ))
        })?;

        let state = TokenState {
            expires_at: Some(expires_at),
            scopes: validated.scopes,
            ..state.clone()
        };
        *self.state.write().await = Some(state.clone());

        Ok(state)
    }

    /// Exchanges `current`'s refresh token and commits the result.
    ///
    /// Callers must hold `refresh_gate`.
    async fn refresh_from(&self, current: &TokenState) -> Result<TokenState, ClientError> {
        debug!("Refreshing user access token");

        let http = self.http_client().await?;
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token.as_str()),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret().expose_secret()),
        ];
        let response = http
            .post(&self.endpoints.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            error!("Token refresh failed with status {}", status.as_u16());
            return Err(ClientError::TokenRefreshError(format!(
                "Failed to refresh token: {body}"
            )));
        }

        let refreshed: TokenResponse = serde_json::from_str(&body)?;
        let expires_in = refreshed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = expiry_after(Utc::now(), expires_in).ok_or_else(|| {
            ClientError::TokenRefreshError(format!(
                "Token endpoint returned out-of-range expires_in: {expires_in}"
            ))
        })?;
        let state = TokenState {
            access_token: refreshed.access_token,
            refresh_token: refreshed
                .refresh_token
                .filter(|token| !token.is_empty())
                .unwrap_or_else(|| current.refresh_token.clone()),
            expires_at: Some(expires_at),
            scopes: refreshed.scope.map(Into::into).unwrap_or_default(),
        };
        *self.state.write().await = Some(state.clone());
        info!("Refreshed access token, expires in {expires_in}s");

        if let Some(observer) = &self.observer
            && let Err(e) = observer.on_token_refresh(&state)
        {
            warn!("Token refresh observer failed: {e:#}");
        }

        Ok(state)
    }

    async fn request_app_token(&self) -> Result<AppToken, ClientError> {
        debug!("Requesting app access token");

        let http = self.http_client().await?;
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret().expose_secret()),
        ];
        let response = http
            .post(&self.endpoints.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            error!("App token request failed with status {}", status.as_u16());
            return Err(ClientError::AuthenticationError(format!(
                "Failed to obtain app token: {body}"
            )));
        }

        let granted: TokenResponse = serde_json::from_str(&body)?;
        let expires_in = granted.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = expiry_after(Utc::now(), expires_in).ok_or_else(|| {
            ClientError::AuthenticationError(format!(
                "Token endpoint returned out-of-range expires_in: {expires_in}"
            ))
        })?;
        info!("Obtained app access token, expires in {expires_in}s");

        Ok(AppToken::new(granted.access_token, expires_at))
    }
}

#[async_trait]
impl AccessTokenProvider for TokenManager {
    fn client_id(&self) -> &str {
        self.credentials.client_id()
    }

    async fn user_token(&self) -> Result<String, ClientError> {
        self.get_token().await
    }

    async fn app_token(&self) -> Result<String, ClientError> {
        self.get_app_token().await
    }

    async fn close(&self) {
        Self::close(self).await;
    }
}
