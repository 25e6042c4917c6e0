//! UGJB E2E Harness
//!
//! Black-box test harness for the UGJB API gateway. Provides the fixture
//! layer the suites build on: environment-driven configuration, a named
//! credential table plus seed-data catalog, a memoizing authenticator, an
//! ephemeral LDAP-backed test user manager, and a request context factory
//! with guaranteed disposal.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Harness (per test)                   │
//! ├──────────────────────────────────────────────────────────┤
//! │  TestConfig        env -> { api_base_url, base_url }     │
//! │  TEST_USERS        static named credentials              │
//! │  SeedCatalog       seed JSON -> parameterized cases      │
//! │  TokenCache        key -> bearer token (memoized)        │
//! │  TestUserManager   create / authenticate / delete users  │
//! │  ContextFactory    key -> authenticated HTTP client      │
//! └──────────────────────────────────────────────────────────┘
//!            │ teardown: dispose contexts, delete users
//! ```

pub mod auth;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod harness;
pub mod retry;
pub mod seed;
pub mod users;

pub use auth::{AuthClient, TokenCache};
pub use config::TestConfig;
pub use context::{ContextFactory, RequestContext};
pub use credentials::{credential, NamedCredential, TEST_USERS};
pub use error::{E2eError, E2eResult};
pub use harness::Harness;
pub use retry::{retry, RetryPolicy};
pub use seed::{build_role_cases, build_user_cases, SeedCase, SeedCatalog, SeedUser};
pub use users::{EphemeralUser, NewUserOptions, TestUserManager};
