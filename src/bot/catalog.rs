//! Role catalog: the fixed, ordered set of claimable roles.

use std::collections::HashSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Longest key accepted. `confirm:<key>` must fit Telegram's 64-byte callback payload.
pub const MAX_KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("role catalog is empty")]
    Empty,

    #[error("duplicate role key: {0}")]
    DuplicateKey(String),

    #[error("invalid role key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("role {0} has an empty name")]
    EmptyName(String),
}

/// Typed role identifier.
///
/// Keys are 1..=32 characters of `[a-z0-9_-]`, so they never contain the
/// `:` separator used in button actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleKey(String);

impl JsonSchema for RoleKey {
    fn schema_name() -> String {
        "RoleKey".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

impl RoleKey {
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let invalid = |reason| CatalogError::InvalidKey {
            key: raw.to_string(),
            reason,
        };
        if raw.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if raw.len() > MAX_KEY_LEN {
            return Err(invalid("longer than 32 characters"));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(invalid("only lowercase letters, digits, '_' and '-' are allowed"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoleKey {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoleKey> for String {
    fn from(key: RoleKey) -> Self {
        key.0
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Role {
    pub key: RoleKey,
    pub name: String,
    pub description: String,
}

/// Validated, immutable list of roles in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleCatalog {
    roles: Vec<Role>,
}

impl RoleCatalog {
    /// Build a catalog, rejecting empty lists, duplicate keys and blank names.
    pub fn new(roles: Vec<Role>) -> Result<Self, CatalogError> {
        if roles.is_empty() {
            return Err(CatalogError::Empty);
        }
        {
            let mut seen = HashSet::new();
            for role in &roles {
                if !seen.insert(role.key.as_str()) {
                    return Err(CatalogError::DuplicateKey(role.key.to_string()));
                }
                if role.name.trim().is_empty() {
                    return Err(CatalogError::EmptyName(role.key.to_string()));
                }
            }
        }
        Ok(Self { roles })
    }

    /// Look up a role by its raw key string.
    pub fn get(&self, key: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.key.as_str() == key)
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self {
            roles: builtin_roles(),
        }
    }
}

fn role(key: &str, name: &str, description: &str) -> Role {
    Role {
        key: RoleKey(key.to_string()),
        name: name.to_string(),
        description: description.to_string(),
    }
}

/// The catalog used when the config file does not define `[[roles]]`.
pub fn builtin_roles() -> Vec<Role> {
    vec![
        role(
            "pm",
            "Project Manager & System Analyst",
            "Responsible for project planning, requirement analysis, system documentation, \
             use-case modeling, coordination among team members, and ensuring timely project delivery.",
        ),
        role(
            "backend",
            "Backend Developer",
            "Responsible for designing backend architecture, implementing REST APIs, handling \
             authentication and authorization, managing complaint and feedback workflows, and \
             integrating the database.",
        ),
        role(
            "frontend",
            "Frontend Developer",
            "Responsible for designing and implementing user interfaces, dashboards for users, \
             officers, and administrators; ensuring responsiveness, usability, and API integration.",
        ),
        role(
            "ml",
            "Machine Learning & Automation Engineer",
            "Responsible for implementing complaint classification, priority prediction, and \
             automatic assignment using NLP techniques such as sentence transformers, improving \
             system intelligence.",
        ),
        role(
            "devops",
            "Database, DevOps & Testing Engineer",
            "Responsible for database schema design, ER diagrams, data integrity, Docker and \
             deployment setup, system testing, and ensuring reliability and performance.",
        ),
    ]
}
