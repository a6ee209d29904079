use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use twitch_common::{CredentialSource, Credentials};

use super::{HELIX_BASE_URL, api_error, query_pairs, rate_limit_reset, to_payload};
use crate::AccessTokenProvider;
use crate::auth::{DEFAULT_TIMEOUT_SECS, TokenManager};
use crate::error::ClientError;

/// Which token authorizes a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    User,
    App,
}

/// Client for the Twitch Helix API.
///
/// Every call fetches a token from the configured [`AccessTokenProvider`]
/// first, so callers never handle tokens directly. Parameters and bodies are
/// any [`Serialize`] value; pass `&()` when a call has none.
///
/// # Examples
///
/// ```no_run
/// use twitch_client::HelixClient;
/// use twitch_common::EnvCredentialSource;
/// use serde_json::json;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = HelixClient::from_source(&EnvCredentialSource::new())?;
///
/// let users = client.get("users", &json!({ "login": ["twitchdev", "twitch"] })).await?;
/// println!("{users}");
///
/// client.close().await;
/// # Ok(())
/// # }
/// ```
pub struct HelixClient {
    provider: Arc<dyn AccessTokenProvider>,
    base_url: String,
    timeout: Duration,
    http: Mutex<Option<reqwest::Client>>,
}

impl fmt::Debug for HelixClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelixClient")
            .field("client_id", &self.provider.client_id())
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HelixClient {
    /// Creates a client backed by a fresh [`TokenManager`].
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::with_token_manager(TokenManager::new(credentials))
    }

    /// Creates a client from credentials resolved by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConfigurationError`] if a required credential
    /// is missing.
    pub fn from_source(source: &dyn CredentialSource) -> Result<Self, ClientError> {
        Ok(Self::with_token_manager(TokenManager::from_source(source)?))
    }

    #[must_use]
    pub fn with_token_manager(manager: TokenManager) -> Self {
        Self::with_provider(Arc::new(manager))
    }

    /// Creates a client that takes its tokens from `provider`.
    ///
    /// The provider may be shared with other clients; [`close`](Self::close)
    /// closes it too.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            provider,
            base_url: HELIX_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            http: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client_id(&self) -> &str {
        self.provider.client_id()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET` with the user token.
    ///
    /// # Errors
    ///
    /// - Token errors from the provider
    /// - [`ClientError::RateLimitError`] on HTTP 429
    /// - [`ClientError::ApiError`] on any other error status
    /// - [`ClientError::InvalidRequest`] if `params` is not an object
    pub async fn get<P>(&self, endpoint: &str, params: &P) -> Result<Value, ClientError>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::GET, endpoint, TokenKind::User, &(), params)
            .await
    }

    /// `POST` with the user token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn post<B, P>(&self, endpoint: &str, body: &B, params: &P) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::POST, endpoint, TokenKind::User, body, params)
            .await
    }

    /// `PATCH` with the user token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn patch<B, P>(&self, endpoint: &str, body: &B, params: &P) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::PATCH, endpoint, TokenKind::User, body, params)
            .await
    }

    /// `PUT` with the user token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn put<B, P>(&self, endpoint: &str, body: &B, params: &P) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::PUT, endpoint, TokenKind::User, body, params)
            .await
    }

    /// `DELETE` with the user token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn delete<P>(&self, endpoint: &str, params: &P) -> Result<Value, ClientError>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::DELETE, endpoint, TokenKind::User, &(), params)
            .await
    }

    /// `GET` with the app token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn get_app<P>(&self, endpoint: &str, params: &P) -> Result<Value, ClientError>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::GET, endpoint, TokenKind::App, &(), params)
            .await
    }

    /// `POST` with the app token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn post_app<B, P>(
        &self,
        endpoint: &str,
        body: &B,
        params: &P,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::POST, endpoint, TokenKind::App, body, params)
            .await
    }

    /// `PATCH` with the app token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn patch_app<B, P>(
        &self,
        endpoint: &str,
        body: &B,
        params: &P,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::PATCH, endpoint, TokenKind::App, body, params)
            .await
    }

    /// `PUT` with the app token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn put_app<B, P>(
        &self,
        endpoint: &str,
        body: &B,
        params: &P,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::PUT, endpoint, TokenKind::App, body, params)
            .await
    }

    /// `DELETE` with the app token.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn delete_app<P>(&self, endpoint: &str, params: &P) -> Result<Value, ClientError>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.send(Method::DELETE, endpoint, TokenKind::App, &(), params)
            .await
    }

    /// Releases the HTTP transport and closes the token provider.
    ///
    /// Safe to call more than once. The client stays usable; the transport
    /// is recreated on the next request.
    pub async fn close(&self) {
        if self.http.lock().await.take().is_some() {
            debug!("Closed Helix HTTP client");
        }
        self.provider.close().await;
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

    async fn send<B, P>(
        &self,
        method: Method,
        endpoint: &str,
        kind: TokenKind,
        body: &B,
        params: &P,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        P: Serialize + ?Sized + Sync,
    {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        // Validate URL construction
        url::Url::parse(&url)
            .map_err(|e| ClientError::ConfigurationError(format!("Invalid URL '{url}': {e}")))?;

        let query = query_pairs(to_payload(params)?)?;
        let body = to_payload(body)?;

        let token = match kind {
            TokenKind::User => self.provider.user_token().await?,
            TokenKind::App => self.provider.app_token().await?,
        };

        let http = self.http_client().await?;
        let mut request = http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header("Client-Id", self.provider.client_id())
            .header(CONTENT_TYPE, "application/json");

        if !query.is_empty() {
            request = request.query(&query);
        }
        if !body.is_null() {
            request = request.body(serde_json::to_string(&body)?);
        }

        debug!("{method} {url} ({kind:?} token)");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = rate_limit_reset(response.headers());
            warn!("Rate limited on {method} {endpoint}, reset at {retry_after:?}");
            return Err(ClientError::RateLimitError { retry_after });
        }

        let text = response.text().await.map_err(|e| {
            warn!("Failed to read response body: {e}");
            ClientError::NetworkError(e)
        })?;

        if status.is_client_error() || status.is_server_error() {
            error!(
                "API request {method} {endpoint} failed with status {}",
                status.as_u16()
            );
            return Err(api_error(status.as_u16(), &text));
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;
    use crate::auth::AuthEndpoints;

    /// Hands out fixed tokens and counts close calls.
    #[derive(Default)]
    struct StaticTokens {
        closed: AtomicUsize,
    }

    #[async_trait]
    impl AccessTokenProvider for StaticTokens {
        fn client_id(&self) -> &str {
            "test_client_id"
        }

        async fn user_token(&self) -> Result<String, ClientError> {
            Ok("user-token".to_string())
        }

        async fn app_token(&self) -> Result<String, ClientError> {
            Ok("app-token".to_string())
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingTokens;

    #[async_trait]
    impl AccessTokenProvider for FailingTokens {
        fn client_id(&self) -> &str {
            "test_client_id"
        }

        async fn user_token(&self) -> Result<String, ClientError> {
            Err(ClientError::TokenRefreshError("refresh token revoked".to_string()))
        }

        async fn app_token(&self) -> Result<String, ClientError> {
            Err(ClientError::AuthenticationError("bad secret".to_string()))
        }

        async fn close(&self) {}
    }

    fn create_test_client(server: &MockServer) -> HelixClient {
        HelixClient::with_provider(Arc::new(StaticTokens::default())).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_get_sends_headers_and_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("client-id", "test_client_id"))
            .and(header("content-type", "application/json"))
            .and(query_param("login", "twitchdev"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "141981764", "login": "twitchdev"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let users = client
            .get("users", &json!({"login": "twitchdev", "after": null}))
            .await
            .unwrap();

        assert_eq!(users["data"][0]["id"], "141981764");
    }

    #[tokio::test]
    async fn test_null_params_are_not_sent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/streams"))
            .respond_with(|request: &Request| {
                let keys: Vec<String> = request.url.query_pairs().map(|(k, _)| k.into_owned()).collect();
                ResponseTemplate::new(200).set_body_json(json!({ "keys": keys }))
            })
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let response = client
            .get("streams", &json!({"first": 20, "after": null}))
            .await
            .unwrap();

        assert_eq!(response["keys"], json!(["first"]));
    }

    #[tokio::test]
    async fn test_array_params_repeat_the_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(|request: &Request| {
                let ids: Vec<String> = request
                    .url
                    .query_pairs()
                    .filter(|(k, _)| k == "id")
                    .map(|(_, v)| v.into_owned())
                    .collect();
                ResponseTemplate::new(200).set_body_json(json!({ "ids": ids }))
            })
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let response = client
            .get("users", &json!({"id": ["1", "2", "3"]}))
            .await
            .unwrap();

        assert_eq!(response["ids"], json!(["1", "2", "3"]));
    }

    #[tokio::test]
    async fn test_rate_limited_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Ratelimit-Reset", "120")
                    .set_body_json(json!({"error": "Too Many Requests", "status": 429})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let err = client.get("users", &()).await.unwrap_err();

        assert!(err.is_rate_limit_error());
        assert_eq!(err.retry_after(), Some(120));
    }

    #[tokio::test]
    async fn test_rate_limited_without_reset_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let err = client.get("users", &()).await.unwrap_err();

        assert!(matches!(err, ClientError::RateLimitError { retry_after: None }));
    }

    #[tokio::test]
    async fn test_post_strips_null_body_fields() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/clips"))
            .and(body_json(json!({"broadcaster_id": "1"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let response = client
            .post("clips", &json!({"broadcaster_id": "1", "title": null}), &())
            .await
            .unwrap();

        assert_eq!(response, json!({}));
    }

    #[tokio::test]
    async fn test_delete_no_content_is_empty_object() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/moderation/bans"))
            .and(header("authorization", "Bearer user-token"))
            .and(query_param("broadcaster_id", "1"))
            .and(query_param("user_id", "9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/eventsub/subscriptions"))
            .and(header("authorization", "Bearer app-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server);

        let unbanned = client
            .delete(
                "moderation/bans",
                &json!({"broadcaster_id": "1", "moderator_id": null, "user_id": "9"}),
            )
            .await
            .unwrap();
        assert_eq!(unbanned, json!({}));

        let unsubscribed = client
            .delete_app("eventsub/subscriptions", &json!({"id": "f1c2a387"}))
            .await
            .unwrap();
        assert_eq!(unsubscribed, json!({}));
    }

    #[tokio::test]
    async fn test_serializable_structs_as_payload() {
        #[derive(Serialize)]
        struct UpdateChannel<'a> {
            title: Option<&'a str>,
            game_id: Option<&'a str>,
        }

        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/channels"))
            .and(query_param("broadcaster_id", "41245072"))
            .and(body_json(json!({"title": "just chatting"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let update = UpdateChannel {
            title: Some("just chatting"),
            game_id: None,
        };
        let response = client
            .patch(
                "channels",
                &update,
                &json!({"broadcaster_id": "41245072"}),
            )
            .await
            .unwrap();

        assert_eq!(response, json!({}));
    }

    #[tokio::test]
    async fn test_api_error_parsing() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/chat/settings"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "Bad Request",
                "status": 400,
                "message": "Missing required parameter \"moderator_id\""
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/moderation/bans"))
            .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
            .mount(&server)
            .await;

        let client = create_test_client(&server);

        match client.put("chat/settings", &json!({"slow_mode": true}), &()).await {
            Err(ClientError::ApiError {
                status,
                message,
                error,
            }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Missing required parameter \"moderator_id\"");
                assert_eq!(error.as_deref(), Some("Bad Request"));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }

        let err = client
            .delete("moderation/bans", &json!({"user_id": "9"}))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.to_string(), "[503] service unavailable");
    }

    #[tokio::test]
    async fn test_app_verbs_use_app_token() {
        let server = MockServer::start().await;

        for verb in ["GET", "POST", "PATCH", "PUT", "DELETE"] {
            Mock::given(method(verb))
                .and(path("/eventsub/subscriptions"))
                .and(header("authorization", "Bearer app-token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verb": verb})))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = create_test_client(&server);
        let endpoint = "eventsub/subscriptions";
        let body = json!({"type": "stream.online"});

        assert_eq!(client.get_app(endpoint, &()).await.unwrap()["verb"], "GET");
        assert_eq!(client.post_app(endpoint, &body, &()).await.unwrap()["verb"], "POST");
        assert_eq!(client.patch_app(endpoint, &body, &()).await.unwrap()["verb"], "PATCH");
        assert_eq!(client.put_app(endpoint, &body, &()).await.unwrap()["verb"], "PUT");
        assert_eq!(client.delete_app(endpoint, &()).await.unwrap()["verb"], "DELETE");
    }

    #[tokio::test]
    async fn test_user_and_app_tokens_never_mixed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/echo"))
            .respond_with(|request: &Request| {
                let authorization: Vec<String> = request
                    .headers
                    .get_all("authorization")
                    .iter()
                    .map(|v| v.to_str().unwrap().to_string())
                    .collect();
                ResponseTemplate::new(200).set_body_json(json!({ "authorization": authorization }))
            })
            .mount(&server)
            .await;

        let client = create_test_client(&server);

        let user = client.get("echo", &()).await.unwrap();
        let app = client.get_app("echo", &()).await.unwrap();

        assert_eq!(user["authorization"], json!(["Bearer user-token"]));
        assert_eq!(app["authorization"], json!(["Bearer app-token"]));
    }

    #[tokio::test]
    async fn test_token_failure_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            HelixClient::with_provider(Arc::new(FailingTokens)).with_base_url(server.uri());

        let err = client.get("users", &()).await.unwrap_err();
        assert!(matches!(err, ClientError::TokenRefreshError(_)));
        assert!(err.is_authentication_error());

        let err = client.get_app("users", &()).await.unwrap_err();
        assert!(matches!(err, ClientError::AuthenticationError(_)));
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let err = client.get("users", &["login", "bot"]).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_empty_object() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/announcements"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = create_test_client(&server);
        let response = client
            .post("/chat/announcements", &json!({"message": "hi"}), &())
            .await
            .unwrap();

        assert_eq!(response, json!({}));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_closes_provider() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(2)
            .mount(&server)
            .await;

        let provider = Arc::new(StaticTokens::default());
        let client = HelixClient::with_provider(provider.clone()).with_base_url(server.uri());

        client.get("users", &()).await.unwrap();
        client.close().await;
        client.close().await;
        assert_eq!(provider.closed.load(Ordering::SeqCst), 2);

        client.get("users", &()).await.unwrap();
    }

    #[tokio::test]
    async fn test_with_token_manager_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oauth2/validate"))
            .and(header("authorization", "OAuth A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "client_id": "test_client_id",
                "login": "bot",
                "scopes": ["clips:edit"],
                "user_id": "1",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/helix/users"))
            .and(header("authorization", "Bearer A"))
            .and(header("client-id", "test_client_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "1"}]})))
            .expect(2)
            .mount(&server)
            .await;

        let credentials = Credentials::new("test_client_id", "test_secret", "A", "R").unwrap();
        let manager = TokenManager::new(credentials)
            .with_endpoints(AuthEndpoints::from_base_url(server.uri()));
        let client = HelixClient::with_token_manager(manager)
            .with_base_url(format!("{}/helix/", server.uri()));

        assert_eq!(client.client_id(), "test_client_id");
        assert_eq!(client.get("users", &()).await.unwrap()["data"][0]["id"], "1");
        assert_eq!(client.get("users", &()).await.unwrap()["data"][0]["id"], "1");

        client.close().await;
    }

    #[test]
    fn test_debug_hides_tokens() {
        let client = HelixClient::with_provider(Arc::new(StaticTokens::default()));
        let debug = format!("{client:?}");

        assert!(debug.contains("test_client_id"));
        assert!(debug.contains(HELIX_BASE_URL));
        assert!(!debug.contains("user-token"));
    }
}
