//! Per-test fixture aggregate
//!
//! One `Harness` is constructed per test and owns that test's token cache,
//! request contexts, and ephemeral users. Nothing is shared across tests, so
//! parallel workers cannot interfere. Teardown must be awaited at the end of
//! the test body; the harness warns if it is dropped with work outstanding.

use std::sync::Arc;

use tracing::warn;

use crate::auth::{AuthClient, TokenCache};
use crate::config::TestConfig;
use crate::context::{ContextFactory, RequestContext};
use crate::error::E2eResult;
use crate::users::{EphemeralUser, NewUserOptions, TestUserManager};

pub struct Harness {
    config: TestConfig,
    tokens: Arc<TokenCache>,
    contexts: ContextFactory,
    users: TestUserManager,
    torn_down: bool,
}

impl Harness {
    /// Harness from process environment (strict config resolution)
    pub fn from_env() -> E2eResult<Self> {
        Ok(Self::new(TestConfig::load()?))
    }

    pub fn new(config: TestConfig) -> Self {
        let tokens = Arc::new(TokenCache::new(AuthClient::new(config.api_base_url.clone())));
        let contexts = ContextFactory::new(config.api_base_url.clone(), Arc::clone(&tokens));
        let users = TestUserManager::with_token_cache(config.api_base_url.clone(), Arc::clone(&tokens));
        Self {
            config,
            tokens,
            contexts,
            users,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Fresh pre-authenticated client for a named credential
    pub async fn authenticated_request(&mut self, key: &str) -> E2eResult<RequestContext> {
        self.contexts.authenticated_context(key).await
    }

    /// One implicitly-managed authenticated user; deleted at teardown
    pub async fn test_user(&mut self) -> E2eResult<EphemeralUser> {
        self.users
            .create_authenticated_user(NewUserOptions::default())
            .await
    }

    /// The raw manager, for tests needing several isolated users
    pub fn user_manager(&mut self) -> &mut TestUserManager {
        &mut self.users
    }

    /// Dispose every context and delete every ephemeral user. Cleanup
    /// failures are collected and logged, never thrown; safe to call more
    /// than once.
    pub async fn teardown(&mut self) {
        self.contexts.dispose_all();
        let failures = self.users.cleanup().await;
        for (uid, error) in &failures {
            warn!(%uid, %error, "teardown could not delete test user");
        }
        self.torn_down = true;
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if !self.torn_down && !self.users.created_users().is_empty() {
            warn!("Harness dropped without teardown(); ephemeral users may linger");
        }
    }
}
