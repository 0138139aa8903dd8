// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod token;
pub mod user;
pub mod workout;

pub use token::{Token, SCOPE_AUTHENTICATION, SCOPE_PASSWORD_RESET};
pub use user::{NewUser, Principal, User};
pub use workout::{Workout, WorkoutEntry, WorkoutPatch};
