//! Integration tests for quarry.

pub mod coercion_test;
pub mod runner_test;
