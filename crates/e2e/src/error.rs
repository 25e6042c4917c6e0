//! Error types for the E2E harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("No API base URL configured. Set API_BASE_URL, or set COLIMA_VM_URL to have the harness combine it with port {port}")]
    MissingConfig { port: u16 },

    #[error("Seed data error: {0}")]
    SeedLoad(String),

    #[error("Authentication failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    #[error("Login succeeded but no token was returned")]
    NoToken,

    #[error("Unknown credential key: {0}")]
    UnknownCredential(String),

    #[error("User provisioning failed with status {status}: {body}")]
    Provisioning { status: u16, body: String },

    #[error("User deletion failed with status {status}: {body}")]
    Deletion { status: u16, body: String },

    #[error("Token is not a valid header value: {0}")]
    InvalidToken(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<E2eError> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
