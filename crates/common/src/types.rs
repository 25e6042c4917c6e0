//! Wire types for the gateway API surface exercised by the harness

use serde::{Deserialize, Serialize};

/// Body for `POST /api/v1/auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token; absent or empty means the login did not yield a session
    #[serde(default)]
    pub token: Option<String>,
    /// Expiry as an RFC 3339 timestamp, informational only
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub user: Option<AuthenticatedUser>,
}

/// Identity returned by login and by `GET /api/v1/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Error body returned by the gateway on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Body for `POST /api/v1/ldap/users` (admin-authenticated)
///
/// Field names follow the LDAP attribute casing the directory expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapUserRequest {
    pub uid: String,
    pub email: String,
    pub password: String,
    pub cn: String,
    pub sn: String,
    #[serde(rename = "givenName")]
    pub given_name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Identity created by the provisioning endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapUserResponse {
    pub uid: String,
    #[serde(default)]
    pub dn: Option<String>,
}

/// Body for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
