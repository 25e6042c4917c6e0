//! Ephemeral test user lifecycle
//!
//! Users are provisioned through the gateway's LDAP-backed endpoint with
//! globally unique uids, so parallel test workers never collide. The manager
//! is the sole deleter of everything it creates.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use ugjb_common::{LdapUserRequest, LdapUserResponse};

use crate::auth::{AuthClient, TokenCache};
use crate::error::{E2eError, E2eResult};
use crate::retry::{retry, RetryPolicy};

const EMAIL_DOMAIN: &str = "test.ugjb.com";
const DEFAULT_PREFIX: &str = "testuser";

/// An account created by the harness for the duration of one test
#[derive(Debug, Clone)]
pub struct EphemeralUser {
    pub uid: String,
    pub email: String,
    pub password: String,
    pub dn: Option<String>,
    pub auth_token: Option<String>,
}

/// Options for [`TestUserManager::create_user`]
#[derive(Debug, Clone, Default)]
pub struct NewUserOptions {
    /// Uid prefix, defaults to `testuser`
    pub prefix: Option<String>,
    /// Directory groups the new account joins
    pub roles: Vec<String>,
    /// Extra attributes merged into the provisioning request body
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewUserOptions {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }
}

/// Globally unique uid: `{prefix}-{epoch_millis}-{random_base36}`
fn unique_uid(prefix: &str) -> String {
    const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{prefix}-{millis}-{suffix}")
}

/// Time-derived password satisfying the directory's complexity policy
fn generated_password() -> String {
    format!("Tu@{}!a", chrono::Utc::now().timestamp_millis())
}

/// Creates and deletes directory-backed test accounts, tracking every user it
/// creates for bulk cleanup at test teardown.
pub struct TestUserManager {
    http: reqwest::Client,
    tokens: Arc<TokenCache>,
    api_base_url: String,
    policy: RetryPolicy,
    created: Vec<EphemeralUser>,
}

impl TestUserManager {
    /// Manager with its own token cache over the fixed credential table
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into();
        let tokens = Arc::new(TokenCache::new(AuthClient::new(api_base_url.clone())));
        Self::with_token_cache(api_base_url, tokens)
    }

    /// Manager sharing a token cache with other fixtures
    pub fn with_token_cache(api_base_url: impl Into<String>, tokens: Arc<TokenCache>) -> Self {
        Self {
            http: reqwest::Client::new(),
            tokens,
            api_base_url: api_base_url.into(),
            policy: RetryPolicy::directory_propagation(),
            created: Vec::new(),
        }
    }

    /// Uids of users created through this manager, in creation order
    pub fn created_users(&self) -> Vec<&str> {
        self.created.iter().map(|u| u.uid.as_str()).collect()
    }

    /// Provision a new uniquely-named account via the admin-authenticated
    /// LDAP endpoint. The account is tracked for cleanup.
    pub async fn create_user(&mut self, options: NewUserOptions) -> E2eResult<EphemeralUser> {
        let prefix = options.prefix.as_deref().unwrap_or(DEFAULT_PREFIX);
        let uid = unique_uid(prefix);
        let email = format!("{uid}@{EMAIL_DOMAIN}");
        let password = generated_password();

        let request = LdapUserRequest {
            uid: uid.clone(),
            email: email.clone(),
            password: password.clone(),
            cn: format!("Test User {uid}"),
            sn: "User".to_string(),
            given_name: "Test".to_string(),
            display_name: format!("Test User {uid}"),
            groups: options.roles.clone(),
        };

        let mut body = serde_json::to_value(&request)?;
        if let Some(object) = body.as_object_mut() {
            for (key, value) in &options.metadata {
                object.insert(key.clone(), value.clone());
            }
        }

        let admin_token = self.tokens.get_token("admin").await?;
        let response = self
            .http
            .post(format!("{}/api/v1/ldap/users", self.api_base_url))
            .bearer_auth(admin_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(E2eError::Provisioning {
                status: status.as_u16(),
                body: text,
            });
        }

        let identity: Option<LdapUserResponse> = serde_json::from_str(&text).ok();
        let user = EphemeralUser {
            uid: identity.as_ref().map(|i| i.uid.clone()).unwrap_or(uid),
            email,
            password,
            dn: identity.and_then(|i| i.dn),
            auth_token: None,
        };

        info!(uid = %user.uid, "created ephemeral test user");
        self.created.push(user.clone());
        Ok(user)
    }

    /// [`create_user`](Self::create_user) followed by authentication under
    /// the propagation-delay retry policy. The directory may take a moment to
    /// make a fresh account loginable; exhaustion surfaces the last failure.
    pub async fn create_authenticated_user(
        &mut self,
        options: NewUserOptions,
    ) -> E2eResult<EphemeralUser> {
        let mut user = self.create_user(options).await?;

        let auth = AuthClient::new(self.api_base_url.clone());
        let email = user.email.clone();
        let password = user.password.clone();
        let token = retry(self.policy, || {
            let auth = auth.clone();
            let email = email.clone();
            let password = password.clone();
            async move { auth.authenticate(&email, &password).await }
        })
        .await?;

        user.auth_token = Some(token.clone());
        if let Some(tracked) = self.created.iter_mut().find(|u| u.uid == user.uid) {
            tracked.auth_token = Some(token);
        }
        Ok(user)
    }

    /// Delete an account by uid. 404 counts as success so a second delete of
    /// the same uid is a no-op.
    pub async fn delete_user(&self, uid: &str) -> E2eResult<()> {
        let admin_token = self.tokens.get_token("admin").await?;
        let response = self
            .http
            .delete(format!("{}/api/v1/ldap/users/{uid}", self.api_base_url))
            .bearer_auth(admin_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status.as_u16() == 404 {
            debug!(uid, already_gone = (status.as_u16() == 404), "deleted ephemeral test user");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(E2eError::Deletion {
            status: status.as_u16(),
            body,
        })
    }

    /// Delete every tracked user in creation order, collecting failures
    /// instead of propagating them, then clear the tracked list. Leaves the
    /// manager reusable even under partial failure; calling it again is a
    /// no-op.
    pub async fn cleanup(&mut self) -> Vec<(String, E2eError)> {
        let users = std::mem::take(&mut self.created);
        let mut failures = Vec::new();

        for user in users {
            if let Err(e) = self.delete_user(&user.uid).await {
                warn!(uid = %user.uid, error = %e, "failed to delete ephemeral test user");
                failures.push((user.uid, e));
            }
        }

        failures
    }
}

impl Drop for TestUserManager {
    fn drop(&mut self) {
        if !self.created.is_empty() {
            warn!(
                count = self.created.len(),
                "TestUserManager dropped with undeleted test users; call cleanup() at teardown"
            );
        }
    }
}
