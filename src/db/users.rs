// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User rows.

use super::Database;
use crate::error::AppError;
use crate::models::{NewUser, User};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;

const USER_COLUMNS: &str = "id, name, username, email, password_hash, created_at, updated_at";

impl Database {
    /// Insert a user. A username or email collision yields
    /// [`AppError::AlreadyExists`] whichever column collided.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let query = format!(
            "INSERT INTO users (name, username, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );

        let created = sqlx::query_as::<_, User>(&query)
            .bind(&user.name)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(self.pool()?)
            .await?;

        tracing::info!(user_id = created.id, username = %created.username, "User created");
        Ok(created)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(self.pool()?)
            .await?)
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(self.pool()?)
            .await?)
    }

    /// Overwrite a user's profile and credential.
    pub async fn update_user(&self, id: i64, user: &NewUser) -> Result<User, AppError> {
        let query = update_user_query();

        bind_user_update(sqlx::query_as::<_, User>(&query), id, user)
            .fetch_optional(self.pool()?)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Overwrite a user's profile with a new credential and delete every
    /// token they hold, in one transaction. If either step fails neither is
    /// applied: the old password and the old tokens stay valid.
    ///
    /// Returns the updated user and the number of tokens revoked.
    pub async fn rotate_user_credentials(
        &self,
        id: i64,
        user: &NewUser,
    ) -> Result<(User, u64), AppError> {
        let mut tx = self.pool()?.begin().await?;

        let query = update_user_query();
        let updated = bind_user_update(sqlx::query_as::<_, User>(&query), id, user)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let revoked = sqlx::query("DELETE FROM tokens WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::info!(user_id = id, revoked, "User credentials rotated");
        Ok((updated, revoked))
    }
}

fn update_user_query() -> String {
    format!(
        "UPDATE users
         SET name = $2, username = $3, email = $4, password_hash = $5, updated_at = now()
         WHERE id = $1
         RETURNING {USER_COLUMNS}"
    )
}

fn bind_user_update<'q>(
    query: QueryAs<'q, Postgres, User, PgArguments>,
    id: i64,
    user: &'q NewUser,
) -> QueryAs<'q, Postgres, User, PgArguments> {
    query
        .bind(id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
}
