//! Seed-data catalog and parameterized case builders
//!
//! The seed file enumerates backend-provisioned accounts and their roles and
//! is treated as ground truth for role-based test generation. The catalog is
//! an explicitly constructed value passed by reference into whatever builds
//! cases; there is no module-level singleton.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// One backend-provisioned account from the seed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SeedFile {
    users: Vec<SeedUser>,
}

/// Immutable catalog of seed users, loaded once per process
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    users: Vec<SeedUser>,
}

impl SeedCatalog {
    /// Load the catalog from a JSON seed file. A missing or malformed file
    /// is a hard error: suites must not silently run against zero users.
    pub fn load(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| E2eError::SeedLoad(format!("cannot read {}: {}", path.display(), e)))?;
        let file: SeedFile = serde_json::from_str(&content)
            .map_err(|e| E2eError::SeedLoad(format!("cannot parse {}: {}", path.display(), e)))?;
        if file.users.is_empty() {
            return Err(E2eError::SeedLoad(format!(
                "{} contains no users",
                path.display()
            )));
        }
        Ok(Self { users: file.users })
    }

    pub fn users(&self) -> &[SeedUser] {
        &self.users
    }

    pub fn first_user(&self) -> &SeedUser {
        &self.users[0]
    }

    pub fn last_user(&self) -> &SeedUser {
        &self.users[self.users.len() - 1]
    }

    /// Distinct roles in first-seen order
    pub fn roles(&self) -> Vec<String> {
        let mut roles: Vec<String> = Vec::new();
        for user in &self.users {
            for role in &user.roles {
                if !roles.contains(role) {
                    roles.push(role.clone());
                }
            }
        }
        roles
    }

    /// Representative user for a role. First match in array order wins;
    /// this tie-break is fixed, not configurable.
    pub fn user_for_role(&self, role: &str) -> Option<&SeedUser> {
        self.users.iter().find(|u| u.roles.iter().any(|r| r == role))
    }
}

/// A generated test case: plain data, framework-agnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCase {
    pub name: String,
    pub email: String,
    pub password: String,
    pub expected_roles: Vec<String>,
}

/// One case per distinct role, bound to that role's representative user
pub fn build_role_cases(catalog: &SeedCatalog) -> Vec<SeedCase> {
    catalog
        .roles()
        .into_iter()
        .filter_map(|role| {
            catalog.user_for_role(&role).map(|user| SeedCase {
                name: format!("role:{role}"),
                email: user.email.clone(),
                password: user.password.clone(),
                expected_roles: user.roles.clone(),
            })
        })
        .collect()
}

/// One case per seed user
pub fn build_user_cases(catalog: &SeedCatalog) -> Vec<SeedCase> {
    catalog
        .users()
        .iter()
        .map(|user| SeedCase {
            name: format!("user:{}", user.email),
            email: user.email.clone(),
            password: user.password.clone(),
            expected_roles: user.roles.clone(),
        })
        .collect()
}
