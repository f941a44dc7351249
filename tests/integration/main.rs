//! End-to-end scenarios against a real SQLite store.

mod class_scenarios;
mod resync_scenarios;
