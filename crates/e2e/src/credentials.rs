//! Fixed named-credential table shared across suites

/// A short symbolic key mapped to a fixed email/password pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedCredential {
    pub key: &'static str,
    pub email: &'static str,
    pub password: &'static str,
}

/// Accounts the backend is expected to have provisioned ahead of a run.
/// `invalid` intentionally does not exist and is used for negative tests.
pub const TEST_USERS: &[NamedCredential] = &[
    NamedCredential {
        key: "admin",
        email: "admin@ugjb.com",
        password: "Admin@123!",
    },
    NamedCredential {
        key: "user",
        email: "user@ugjb.com",
        password: "User@123!",
    },
    NamedCredential {
        key: "test",
        email: "test@ugjb.com",
        password: "Test@123!",
    },
    NamedCredential {
        key: "invalid",
        email: "nobody@ugjb.com",
        password: "wrong-password",
    },
];

/// Look up a named credential by key
pub fn credential(key: &str) -> Option<&'static NamedCredential> {
    TEST_USERS.iter().find(|c| c.key == key)
}
