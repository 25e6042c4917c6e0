//! Environment-driven harness configuration
//!
//! Resolution is strict: when neither `API_BASE_URL` nor `COLIMA_VM_URL` is
//! set, loading fails with an error naming both variables. Silent localhost
//! defaulting masks misconfiguration in CI.

use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Port the gateway listens on when reached through the Colima VM host
pub const COLIMA_GATEWAY_PORT: u16 = 8080;

/// Resolved harness configuration
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Base URL of the API gateway, no trailing slash
    pub api_base_url: String,

    /// Base URL of the proxied frontend; defaults to the API base
    pub base_url: String,

    /// Pre-issued bearer token, when the environment supplies one
    pub test_token: Option<String>,
}

impl TestConfig {
    /// Load from the process environment
    pub fn load() -> E2eResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary lookup. Pure function of the lookup, which
    /// keeps the policy testable without mutating process env.
    pub fn from_lookup<F>(lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = match lookup("API_BASE_URL") {
            Some(url) if !url.is_empty() => url,
            _ => match lookup("COLIMA_VM_URL") {
                Some(host) if !host.is_empty() => {
                    format!("{}:{}", host.trim_end_matches('/'), COLIMA_GATEWAY_PORT)
                }
                _ => {
                    return Err(E2eError::MissingConfig {
                        port: COLIMA_GATEWAY_PORT,
                    })
                }
            },
        };
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let base_url = lookup("BASE_URL")
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_base_url.clone());

        let test_token = lookup("TEST_TOKEN").filter(|token| !token.is_empty());

        debug!(%api_base_url, %base_url, "resolved harness config");

        Ok(Self {
            api_base_url,
            base_url,
            test_token,
        })
    }
}
