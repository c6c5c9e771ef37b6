//! Unit tests - parser behaviour exercised through the public API
//!
//! These tests need no store; they only parse and render scripts.

mod parser_robustness_tests;
mod round_trip_tests;
