//! UGJB Common Library
//!
//! Wire types for the UGJB gateway API, shared between the e2e harness and
//! the mock gateway used by the hermetic suites.

pub mod types;

pub use types::{
    ApiErrorBody, AuthenticatedUser, HealthResponse, LdapUserRequest, LdapUserResponse,
    LoginRequest, LoginResponse,
};

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
