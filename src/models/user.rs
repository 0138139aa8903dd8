//! User model and the request-scoped principal.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Registered user as stored in the `users` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Display name
    pub name: String,
    /// Unique login name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Argon2 PHC string; never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Identity resolved for a request.
///
/// `Anonymous` has no database row; handlers match on the variant instead of
/// comparing against a sentinel user.
#[derive(Debug, Clone, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    Registered(User),
}

impl Principal {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    /// The registered user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Principal::Anonymous => None,
            Principal::Registered(user) => Some(user),
        }
    }
}
