//! Bearer token model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Token scope used for API authentication.
pub const SCOPE_AUTHENTICATION: &str = "authentication";
/// Token scope reserved for password reset links.
pub const SCOPE_PASSWORD_RESET: &str = "password-reset";

/// A freshly issued token.
///
/// `plaintext` exists only in the value returned from issuance; the store
/// keeps `hash` alone.
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    #[serde(rename = "token")]
    pub plaintext: String,
    #[serde(skip)]
    pub hash: Vec<u8>,
    #[serde(skip)]
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub scope: String,
}
