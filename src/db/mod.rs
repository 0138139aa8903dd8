//! Database layer (PostgreSQL).

pub mod postgres;
pub mod tokens;
pub mod users;
pub mod workouts;

pub use postgres::Database;
