//! In-process mock gateway for the hermetic suites
//!
//! Implements just enough of the gateway API surface for the harness
//! contracts: login, me, LDAP provisioning/deletion, and health. Keeps spy
//! counters (login calls) and can simulate directory propagation delay by
//! rejecting the first N login attempts for a freshly provisioned account.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tokio::sync::Mutex;

use ugjb_common::{ApiErrorBody, AuthenticatedUser, HealthResponse, LoginRequest, LoginResponse};
use ugjb_e2e::TEST_USERS;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password: String,
    name: Option<String>,
    roles: Vec<String>,
    /// Remaining login attempts that fail while the directory "propagates"
    pending_logins: u32,
}

#[derive(Debug, Default)]
struct GatewayState {
    /// email -> account
    accounts: HashMap<String, Account>,
    /// bearer token -> email
    sessions: HashMap<String, String>,
    login_calls: usize,
    /// Applied to accounts created through the LDAP endpoint
    propagation_delay: u32,
    /// When false, login succeeds but omits the token field (degraded mode)
    withhold_tokens: bool,
    next_session: u64,
}

type SharedState = Arc<Mutex<GatewayState>>;

pub struct MockGateway {
    pub base_url: String,
    state: SharedState,
}

impl MockGateway {
    /// Gateway with the named credentials provisioned and no propagation delay
    pub async fn start() -> Self {
        Self::start_with_propagation_delay(0).await
    }

    /// Gateway where freshly provisioned accounts reject their first
    /// `delay` login attempts with 401
    pub async fn start_with_propagation_delay(delay: u32) -> Self {
        let mut state = GatewayState {
            propagation_delay: delay,
            ..GatewayState::default()
        };

        // Backend-provisioned named accounts; "invalid" deliberately absent.
        for credential in TEST_USERS.iter().filter(|c| c.key != "invalid") {
            let roles = if credential.key == "admin" {
                vec!["admin".to_string()]
            } else {
                vec!["user".to_string()]
            };
            state.accounts.insert(
                credential.email.to_string(),
                Account {
                    uid: credential.key.to_string(),
                    email: credential.email.to_string(),
                    password: credential.password.to_string(),
                    name: None,
                    roles,
                    pending_logins: 0,
                },
            );
        }

        let state: SharedState = Arc::new(Mutex::new(state));

        let app = Router::new()
            .route("/api/v1/auth/login", post(handle_login))
            .route("/api/v1/auth/me", get(handle_me))
            .route("/api/v1/ldap/users", post(handle_create_user))
            .route("/api/v1/ldap/users/:uid", delete(handle_delete_user))
            .route("/health", get(handle_health))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock gateway");
        let addr = listener.local_addr().expect("mock gateway addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock gateway");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Total calls the login endpoint has seen (cache spy)
    pub async fn login_calls(&self) -> usize {
        self.state.lock().await.login_calls
    }

    /// Make login return 200 without a token, as a degraded gateway would
    pub async fn withhold_tokens(&self) {
        self.state.lock().await.withhold_tokens = true;
    }

    pub async fn has_user(&self, email: &str) -> bool {
        self.state.lock().await.accounts.contains_key(email)
    }

    /// Provision an account directly, bypassing the LDAP endpoint
    pub async fn provision(&self, uid: &str, email: &str, password: &str, roles: &[&str]) {
        self.state.lock().await.accounts.insert(
            email.to_string(),
            Account {
                uid: uid.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                name: None,
                roles: roles.iter().map(|r| r.to_string()).collect(),
                pending_logins: 0,
            },
        );
    }

    /// Provision every user from a seed catalog
    pub async fn provision_catalog(&self, catalog: &ugjb_e2e::SeedCatalog) {
        let mut state = self.state.lock().await;
        for user in catalog.users() {
            state.accounts.insert(
                user.email.clone(),
                Account {
                    uid: user.id.clone(),
                    email: user.email.clone(),
                    password: user.password.clone(),
                    name: user.name.clone(),
                    roles: user.roles.clone(),
                    pending_logins: 0,
                },
            );
        }
    }
}

fn error_body(message: &str) -> Json<ApiErrorBody> {
    Json(ApiErrorBody {
        error: message.to_string(),
    })
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn authenticated_account(state: &GatewayState, headers: &HeaderMap) -> Option<Account> {
    let token = bearer(headers)?;
    let email = state.sessions.get(&token)?;
    state.accounts.get(email).cloned()
}

async fn handle_login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ApiErrorBody>)> {
    let mut state = state.lock().await;
    state.login_calls += 1;

    let unauthorized = (StatusCode::UNAUTHORIZED, error_body("invalid credentials"));

    let Some(account) = state.accounts.get_mut(&request.email) else {
        return Err(unauthorized);
    };
    if account.pending_logins > 0 {
        account.pending_logins -= 1;
        return Err(unauthorized);
    }
    if account.password != request.password {
        return Err(unauthorized);
    }

    let account = account.clone();

    if state.withhold_tokens {
        return Ok(Json(LoginResponse {
            token: None,
            expires_at: None,
            user: None,
        }));
    }

    state.next_session += 1;
    let token = format!("tok-{}-{}", account.uid, state.next_session);
    state.sessions.insert(token.clone(), account.email.clone());

    Ok(Json(LoginResponse {
        token: Some(token),
        expires_at: Some("2099-01-01T00:00:00Z".to_string()),
        user: Some(AuthenticatedUser {
            id: account.uid,
            email: account.email,
            name: account.name,
            roles: account.roles,
        }),
    }))
}

async fn handle_me(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<AuthenticatedUser>, (StatusCode, Json<ApiErrorBody>)> {
    let state = state.lock().await;
    match authenticated_account(&state, &headers) {
        Some(account) => Ok(Json(AuthenticatedUser {
            id: account.uid,
            email: account.email,
            name: account.name,
            roles: account.roles,
        })),
        None => Err((StatusCode::UNAUTHORIZED, error_body("invalid token"))),
    }
}

async fn handle_create_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<ApiErrorBody>)> {
    let mut state = state.lock().await;

    match authenticated_account(&state, &headers) {
        Some(account) if account.roles.iter().any(|r| r == "admin") => {}
        Some(_) => return Err((StatusCode::FORBIDDEN, error_body("admin role required"))),
        None => return Err((StatusCode::UNAUTHORIZED, error_body("invalid token"))),
    }

    let request: ugjb_common::LdapUserRequest = serde_json::from_value(body)
        .map_err(|e| (StatusCode::BAD_REQUEST, error_body(&e.to_string())))?;

    if state.accounts.contains_key(&request.email) {
        return Err((StatusCode::CONFLICT, error_body("uid already exists")));
    }

    let pending = state.propagation_delay;
    state.accounts.insert(
        request.email.clone(),
        Account {
            uid: request.uid.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
            name: Some(request.display_name.clone()),
            roles: request.groups.clone(),
            pending_logins: pending,
        },
    );

    let dn = format!("uid={},ou=people,dc=ugjb,dc=com", request.uid);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "uid": request.uid, "dn": dn })),
    ))
}

async fn handle_delete_user(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<ApiErrorBody>)> {
    let mut state = state.lock().await;

    match authenticated_account(&state, &headers) {
        Some(account) if account.roles.iter().any(|r| r == "admin") => {}
        Some(_) => return Err((StatusCode::FORBIDDEN, error_body("admin role required"))),
        None => return Err((StatusCode::UNAUTHORIZED, error_body("invalid token"))),
    }

    let email = state
        .accounts
        .values()
        .find(|a| a.uid == uid)
        .map(|a| a.email.clone());

    match email {
        Some(email) => {
            state.accounts.remove(&email);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err((StatusCode::NOT_FOUND, error_body("user not found"))),
    }
}

async fn handle_health(State(_state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Initialize tracing once per test binary
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}
