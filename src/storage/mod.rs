//! Storage layer for treeguard
//!
//! One SQLite table per collection: documentations, classes, skills and
//! activities.

pub mod migrations;
pub mod sqlite;

pub use sqlite::Database;
