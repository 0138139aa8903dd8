// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout CRUD for the authenticated user.
//!
//! Every route that names a workout id checks ownership before reading
//! anything. A workout that does not exist and one owned by someone else
//! both answer 403, so ids of other users' workouts cannot be enumerated.

use super::extract::{parse_id, ValidatedJson};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{Workout, WorkoutEntry, WorkoutPatch};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

/// Workout routes. The `require_user` layer is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workouts", get(list_workouts).post(create_workout))
        .route(
            "/workouts/{id}",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
}

// ─── Request bodies ──────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_entry_measure"))]
pub struct EntryRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub exercise_name: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub sets: i32,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub reps: Option<i32>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub duration_seconds: Option<i32>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub notes: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
}

/// An entry is measured in reps or in seconds, never both.
fn validate_entry_measure(entry: &EntryRequest) -> std::result::Result<(), ValidationError> {
    match (entry.reps, entry.duration_seconds) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => {
            let mut err = ValidationError::new("reps_or_duration");
            err.message = Some("exactly one of reps or duration_seconds is required".into());
            Err(err)
        }
    }
}

impl From<EntryRequest> for WorkoutEntry {
    fn from(req: EntryRequest) -> Self {
        WorkoutEntry {
            exercise_name: req.exercise_name,
            sets: req.sets,
            reps: req.reps,
            duration_seconds: req.duration_seconds,
            weight: req.weight,
            notes: req.notes,
            order_index: req.order_index,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkoutRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub duration_minutes: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default)]
    pub calories_burned: i32,
    #[validate(nested)]
    #[serde(default)]
    pub entries: Vec<EntryRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorkoutRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub calories_burned: Option<i32>,
    #[validate(nested)]
    pub entries: Option<Vec<EntryRequest>>,
}

impl From<UpdateWorkoutRequest> for WorkoutPatch {
    fn from(req: UpdateWorkoutRequest) -> Self {
        WorkoutPatch {
            title: req.title,
            description: req.description,
            duration_minutes: req.duration_minutes,
            calories_burned: req.calories_burned,
            entries: req
                .entries
                .map(|entries| entries.into_iter().map(WorkoutEntry::from).collect()),
        }
    }
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct WorkoutResponse {
    pub workout: Workout,
}

#[derive(Serialize)]
pub struct WorkoutListResponse {
    pub workouts: Vec<Workout>,
}

// ─── Handlers ────────────────────────────────────────────────

/// Fail with 403 unless `user_id` owns workout `id`.
async fn ensure_owner(state: &AppState, id: i64, user_id: i64) -> Result<()> {
    if state.db.owns_workout(id, user_id).await? {
        Ok(())
    } else {
        tracing::warn!(workout_id = id, user_id, "Workout access denied");
        Err(AppError::Forbidden)
    }
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<WorkoutListResponse>> {
    let workouts = state.db.list_workouts(user.id).await?;
    Ok(Json(WorkoutListResponse { workouts }))
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutResponse>)> {
    let workout = Workout {
        title: req.title,
        description: req.description,
        duration_minutes: req.duration_minutes,
        calories_burned: req.calories_burned,
        entries: req.entries.into_iter().map(WorkoutEntry::from).collect(),
        user_id: user.id,
        ..Default::default()
    };

    let workout = state.db.create_workout(&workout).await?;
    Ok((StatusCode::CREATED, Json(WorkoutResponse { workout })))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<WorkoutResponse>> {
    let id = parse_id(&raw_id)?;
    ensure_owner(&state, id, user.id).await?;

    let workout = state.db.get_workout_by_id(id).await?;
    Ok(Json(WorkoutResponse { workout }))
}

async fn update_workout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(raw_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateWorkoutRequest>,
) -> Result<Json<WorkoutResponse>> {
    let id = parse_id(&raw_id)?;
    ensure_owner(&state, id, user.id).await?;

    let mut workout = state.db.get_workout_by_id(id).await?;
    WorkoutPatch::from(req).apply(&mut workout);

    let workout = state.db.update_workout(id, &workout).await?;
    Ok(Json(WorkoutResponse { workout }))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&raw_id)?;
    ensure_owner(&state, id, user.id).await?;

    state.db.delete_workout(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
