// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout aggregate: a workout and its ordered entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Workout aggregate root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct Workout {
    /// Generated on insert (0 until then)
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    /// Entries ordered by `order_index`
    #[sqlx(skip)]
    pub entries: Vec<WorkoutEntry>,
    /// Owning user
    pub user_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One exercise within a workout.
///
/// Exactly one of `reps` or `duration_seconds` must be set; the
/// `valid_workout_entry` check constraint enforces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct WorkoutEntry {
    pub id: i64,
    pub exercise_name: String,
    pub sets: i32,
    pub reps: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub weight: f64,
    pub notes: String,
    pub order_index: i32,
    /// Inherited from the parent workout
    #[serde(skip)]
    pub user_id: i64,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Sparse update to a workout. Absent fields keep their current value;
/// `entries`, when present, replaces the whole list.
#[derive(Debug, Clone, Default)]
pub struct WorkoutPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub calories_burned: Option<i32>,
    pub entries: Option<Vec<WorkoutEntry>>,
}

impl WorkoutPatch {
    /// Overlay this patch on an existing aggregate.
    pub fn apply(self, workout: &mut Workout) {
        if let Some(title) = self.title {
            workout.title = title;
        }
        if let Some(description) = self.description {
            workout.description = description;
        }
        if let Some(duration) = self.duration_minutes {
            workout.duration_minutes = duration;
        }
        if let Some(calories) = self.calories_burned {
            workout.calories_burned = calories;
        }
        if let Some(entries) = self.entries {
            workout.entries = entries;
        }
    }
}

impl Workout {
    /// Entries sorted by `order_index`, ties kept in submission order.
    pub fn entries_in_order(&self) -> Vec<&WorkoutEntry> {
        let mut entries: Vec<&WorkoutEntry> = self.entries.iter().collect();
        entries.sort_by_key(|e| e.order_index);
        entries
    }
}
