//! Common utilities for the Koala text engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - deduplicated, colored terminal output for degraded input

pub mod warning;
