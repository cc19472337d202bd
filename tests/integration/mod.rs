//! Integration test suite for conductor.
//!
//! These tests exercise the full path from workflow submission to
//! settlement, including dispatch, completion reconciliation, and the
//! failure modes in between. They verify that all components work
//! together correctly.
//!
//! # Test Categories
//!
//! - `sequential_flow`: Head-only dispatch, in-order chaining, and
//!   duplicate completion absorption
//! - `parallel_flow`: Full fan-out at submission and mixed outcomes
//! - `reconciliation`: Unknown events, failure stalls, version
//!   conflicts, and publish failures
//!
//! # CI Compatibility
//!
//! No real queue or database is involved; the in-memory store and
//! channel make these tests safe and fast in CI environments. Tests
//! that run a live worker poll for settlement with a generous timeout.


mod sequential_flow;
mod parallel_flow;
