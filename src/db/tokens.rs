// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token digest rows.

use super::Database;
use crate::error::AppError;
use crate::models::{Token, User};
use chrono::{DateTime, Utc};

impl Database {
    /// Persist a token's digest, owner, scope and expiry. The plaintext is
    /// never written.
    pub async fn insert_token(&self, token: &Token) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tokens (hash, user_id, scope, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&token.hash)
        .bind(token.user_id)
        .bind(&token.scope)
        .bind(token.expires_at)
        .execute(self.pool()?)
        .await?;
        Ok(())
    }

    /// Owner of a live token matching `(scope, digest)`, if any.
    pub async fn get_user_for_token(
        &self,
        scope: &str,
        digest: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT users.id, users.name, users.username, users.email,
                    users.password_hash, users.created_at, users.updated_at
             FROM users
             INNER JOIN tokens ON tokens.user_id = users.id
             WHERE tokens.hash = $1 AND tokens.scope = $2 AND tokens.expires_at > $3",
        )
        .bind(digest)
        .bind(scope)
        .bind(now)
        .fetch_optional(self.pool()?)
        .await?)
    }

    /// Delete every token for a user. No rows is not an error.
    pub async fn delete_all_tokens_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected())
    }

    /// Housekeeping: drop rows that can no longer validate.
    pub async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected())
    }
}
