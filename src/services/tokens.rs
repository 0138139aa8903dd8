// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Opaque bearer tokens.
//!
//! Tokens are 32 random bytes, URL-safe base64 encoded. Only the SHA-256
//! digest of the plaintext is stored; a fast hash is enough because the
//! plaintext already carries 256 bits of entropy.

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Principal, Token};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

/// Random bytes per token.
pub const TOKEN_BYTES: usize = 32;

/// Generate a token without persisting it.
///
/// A zero or negative `ttl` is accepted and produces a token that is
/// already expired.
pub fn generate_token(user_id: i64, ttl: chrono::Duration, scope: &str) -> Result<Token> {
    let mut bytes = [0u8; TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System entropy source failed")))?;

    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::BadRequest("Token lifetime out of range".to_string()))?;

    let plaintext = URL_SAFE_NO_PAD.encode(bytes);
    let hash = token_digest(&plaintext);

    Ok(Token {
        plaintext,
        hash,
        user_id,
        expires_at,
        scope: scope.to_string(),
    })
}

/// Digest stored in place of a token's plaintext.
pub fn token_digest(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// Issues, validates and revokes tokens against the store.
#[derive(Clone)]
pub struct TokenService {
    db: Database,
}

impl TokenService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Generate and persist a token. The returned plaintext is not
    /// retrievable afterwards.
    pub async fn issue(&self, user_id: i64, ttl: chrono::Duration, scope: &str) -> Result<Token> {
        let token = generate_token(user_id, ttl, scope)?;
        self.db.insert_token(&token).await?;

        tracing::info!(
            user_id,
            scope,
            expires_at = %token.expires_at,
            "Token issued"
        );

        Ok(token)
    }

    /// Resolve a plaintext token to its owner.
    ///
    /// Unknown, expired and wrong-scope tokens all yield
    /// [`AppError::InvalidCredentials`].
    pub async fn validate(&self, scope: &str, plaintext: &str) -> Result<Principal> {
        let digest = token_digest(plaintext);

        self.db
            .get_user_for_token(scope, &digest, Utc::now())
            .await?
            .map(Principal::Registered)
            .ok_or(AppError::InvalidCredentials)
    }

    /// Delete every token the user holds. Returns the number removed.
    pub async fn revoke_all(&self, user_id: i64) -> Result<u64> {
        let removed = self.db.delete_all_tokens_for_user(user_id).await?;
        tracing::info!(user_id, removed, "Revoked all tokens for user");
        Ok(removed)
    }
}
