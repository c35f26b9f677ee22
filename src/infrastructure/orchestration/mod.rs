//! Application orchestration.
//!
//! Runtime wiring and lifecycle management for the engine tasks.

pub mod runtime;

pub use runtime::{run_with_shutdown, Services};
