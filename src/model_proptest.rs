//! Property-based tests for the model and merge rules.
//!
//! These tests use proptest to generate random artifact ids, bundle lists
//! and JSON arrays and verify that the merge invariants hold for all of
//! them.
