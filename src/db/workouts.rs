// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout aggregates.
//!
//! A workout and its entries are written in one transaction: create inserts
//! both, update rewrites the scalar row and replaces the whole entry list.
//! A `sqlx::Transaction` that is dropped before `commit` rolls back, so an
//! early `?` return or a cancelled request leaves no partial state.
//!
//! None of these methods check ownership. Callers gate on
//! [`Database::owns_workout`] first.

use super::Database;
use crate::error::AppError;
use crate::models::{Workout, WorkoutEntry};
use sqlx::PgConnection;

const WORKOUT_COLUMNS: &str =
    "id, title, description, duration_minutes, calories_burned, user_id, created_at, updated_at";

const ENTRY_COLUMNS: &str = "id, exercise_name, sets, reps, duration_seconds, weight, notes, \
                             order_index, user_id, created_at, updated_at";

impl Database {
    /// Insert a workout and all of its entries atomically.
    ///
    /// Entries are written in ascending `order_index` and inherit the
    /// workout's `user_id`. Returns the aggregate with generated ids and
    /// timestamps filled in.
    pub async fn create_workout(&self, workout: &Workout) -> Result<Workout, AppError> {
        let mut tx = self.pool()?.begin().await?;

        let query = format!(
            "INSERT INTO workouts (title, description, duration_minutes, calories_burned, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {WORKOUT_COLUMNS}"
        );

        let mut created = sqlx::query_as::<_, Workout>(&query)
            .bind(&workout.title)
            .bind(&workout.description)
            .bind(workout.duration_minutes)
            .bind(workout.calories_burned)
            .bind(workout.user_id)
            .fetch_one(&mut *tx)
            .await?;

        created.entries = insert_entries(&mut *tx, created.id, created.user_id, workout).await?;

        tx.commit().await?;

        tracing::info!(
            workout_id = created.id,
            user_id = created.user_id,
            entries = created.entries.len(),
            "Workout created"
        );

        Ok(created)
    }

    /// Replace a workout's scalar fields and its entire entry list.
    ///
    /// Fails with [`AppError::NotFound`] if no workout has `id`; nothing is
    /// applied in that case or when any entry insert fails.
    pub async fn update_workout(&self, id: i64, workout: &Workout) -> Result<Workout, AppError> {
        let mut tx = self.pool()?.begin().await?;

        // The row lock taken here serializes concurrent updates of the same
        // workout until commit.
        let query = format!(
            "UPDATE workouts
             SET title = $2, description = $3, duration_minutes = $4, calories_burned = $5,
                 updated_at = now()
             WHERE id = $1
             RETURNING {WORKOUT_COLUMNS}"
        );

        let mut updated = sqlx::query_as::<_, Workout>(&query)
            .bind(id)
            .bind(&workout.title)
            .bind(&workout.description)
            .bind(workout.duration_minutes)
            .bind(workout.calories_burned)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

        sqlx::query("DELETE FROM workout_entries WHERE workout_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        updated.entries = insert_entries(&mut *tx, id, updated.user_id, workout).await?;

        tx.commit().await?;

        tracing::info!(
            workout_id = id,
            entries = updated.entries.len(),
            "Workout updated"
        );

        Ok(updated)
    }

    /// Load a workout with its entries in `order_index` order.
    pub async fn get_workout_by_id(&self, id: i64) -> Result<Workout, AppError> {
        let pool = self.pool()?;

        let query = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = $1");
        let mut workout = sqlx::query_as::<_, Workout>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM workout_entries
             WHERE workout_id = $1
             ORDER BY order_index, id"
        );
        workout.entries = sqlx::query_as::<_, WorkoutEntry>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(workout)
    }

    /// A user's workouts, newest first. Entries are not loaded.
    pub async fn list_workouts(&self, user_id: i64) -> Result<Vec<Workout>, AppError> {
        let query = format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );

        Ok(sqlx::query_as::<_, Workout>(&query)
            .bind(user_id)
            .fetch_all(self.pool()?)
            .await?)
    }

    /// Whether `user_id` owns workout `id`. False for absent workouts.
    pub async fn owns_workout(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let (owns,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM workouts WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.pool()?)
        .await?;
        Ok(owns)
    }

    /// Delete a workout; its entries go with it via `ON DELETE CASCADE`.
    pub async fn delete_workout(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(self.pool()?)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Workout {} not found", id)));
        }

        tracing::info!(workout_id = id, "Workout deleted");
        Ok(())
    }
}

/// Insert `workout`'s entries under `workout_id` in `order_index` order.
async fn insert_entries(
    conn: &mut PgConnection,
    workout_id: i64,
    user_id: i64,
    workout: &Workout,
) -> Result<Vec<WorkoutEntry>, AppError> {
    let query = format!(
        "INSERT INTO workout_entries
             (workout_id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index, user_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {ENTRY_COLUMNS}"
    );

    let mut inserted = Vec::with_capacity(workout.entries.len());
    for entry in workout.entries_in_order() {
        let row = sqlx::query_as::<_, WorkoutEntry>(&query)
            .bind(workout_id)
            .bind(&entry.exercise_name)
            .bind(entry.sets)
            .bind(entry.reps)
            .bind(entry.duration_seconds)
            .bind(entry.weight)
            .bind(&entry.notes)
            .bind(entry.order_index)
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;
        inserted.push(row);
    }

    Ok(inserted)
}

