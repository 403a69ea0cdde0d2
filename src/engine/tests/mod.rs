//! Tests for the execution engine
//!
//! Organized by concern: whole-transcript behavior, then streaming order,
//! laziness, and cancellation.

mod helpers;
