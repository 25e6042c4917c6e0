//! Login client and per-run token cache

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use ugjb_common::{AuthenticatedUser, LoginRequest, LoginResponse};

use crate::credentials::{NamedCredential, TEST_USERS};
use crate::error::{E2eError, E2eResult};

/// Thin client for the gateway's auth endpoints
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    api_base_url: String,
}

impl AuthClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: api_base_url.into(),
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Non-2xx surfaces as [`E2eError::Auth`] carrying status and body; a 2xx
    /// response without a token field is [`E2eError::NoToken`].
    pub async fn authenticate(&self, email: &str, password: &str) -> E2eResult<String> {
        let response = self
            .http
            .post(format!("{}/api/v1/auth/login", self.api_base_url))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(E2eError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let body: LoginResponse = response.json().await?;
        match body.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(E2eError::NoToken),
        }
    }

    /// Validate a token's usability via `GET /api/v1/auth/me`
    pub async fn me(&self, token: &str) -> E2eResult<AuthenticatedUser> {
        let response = self
            .http
            .get(format!("{}/api/v1/auth/me", self.api_base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(E2eError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Per-run memoization of bearer tokens by named-credential key.
///
/// The map lock spans the login round trip, so concurrent lookups for the
/// same key resolve with a single network call. There is no TTL and no
/// invalidation: a cache lives exactly as long as its owning fixture, and
/// token expiry is the backend's concern.
pub struct TokenCache {
    auth: AuthClient,
    credentials: Vec<NamedCredential>,
    tokens: Mutex<HashMap<String, String>>,
}

impl TokenCache {
    /// Cache over the fixed [`TEST_USERS`] table
    pub fn new(auth: AuthClient) -> Self {
        Self::with_credentials(auth, TEST_USERS.to_vec())
    }

    /// Cache over an explicit credential table
    pub fn with_credentials(auth: AuthClient, credentials: Vec<NamedCredential>) -> Self {
        Self {
            auth,
            credentials,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Token for a named credential, authenticating on first use
    pub async fn get_token(&self, key: &str) -> E2eResult<String> {
        let mut tokens = self.tokens.lock().await;
        if let Some(token) = tokens.get(key) {
            debug!(key, "token cache hit");
            return Ok(token.clone());
        }

        let credential = self
            .credentials
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| E2eError::UnknownCredential(key.to_string()))?;

        debug!(key, "token cache miss, authenticating");
        let token = self
            .auth
            .authenticate(credential.email, credential.password)
            .await?;
        tokens.insert(key.to_string(), token.clone());
        Ok(token)
    }
}
