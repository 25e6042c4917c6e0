//! Authenticated request contexts with guaranteed disposal

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::debug;

use crate::auth::TokenCache;
use crate::error::{E2eError, E2eResult};

/// An HTTP client bound to one bearer token and a base URL
#[derive(Debug, Clone)]
pub struct RequestContext {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl RequestContext {
    fn new(key: &str, token: &str, base_url: &str) -> E2eResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| E2eError::InvalidToken(e.to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            key: key.to_string(),
        })
    }

    /// Named-credential key this context authenticates as
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path))
    }
}

/// Hands out pre-authenticated clients and disposes all of them at teardown.
///
/// Tokens are memoized per named key; clients are not. Each call yields a
/// fresh client, and every client handed out is recorded so disposal happens
/// exactly once per context, in creation order.
pub struct ContextFactory {
    tokens: Arc<TokenCache>,
    base_url: String,
    created: Vec<RequestContext>,
}

impl ContextFactory {
    pub fn new(base_url: impl Into<String>, tokens: Arc<TokenCache>) -> Self {
        Self {
            tokens,
            base_url: base_url.into(),
            created: Vec::new(),
        }
    }

    /// Fresh authenticated context for a named credential
    pub async fn authenticated_context(&mut self, key: &str) -> E2eResult<RequestContext> {
        let token = self.tokens.get_token(key).await?;
        let context = RequestContext::new(key, &token, &self.base_url)?;
        self.created.push(context.clone());
        Ok(context)
    }

    /// Contexts currently awaiting disposal
    pub fn active_contexts(&self) -> usize {
        self.created.len()
    }

    /// Drop every recorded context in creation order. Idempotent.
    pub fn dispose_all(&mut self) {
        for context in self.created.drain(..) {
            debug!(key = %context.key, "disposing request context");
        }
    }
}

impl Drop for ContextFactory {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
