//! Integration suite for the library crate.

mod driver_tests;
mod manifest_tests;
