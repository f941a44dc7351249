//! Property-based tests for class name normalization and aggregate upkeep.

mod aggregate_tests;
mod normalization_tests;
