//! Keeps class aggregates in step with documentation entries.

pub mod activities;
pub mod classes;
pub mod engine;
pub mod resync;

pub use classes::ClassProgress;
pub use engine::Synchronizer;
pub use resync::{ResyncOptions, ResyncReport};
