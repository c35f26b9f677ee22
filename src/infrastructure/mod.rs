//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, collaborator wiring and task lifecycle.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`orchestration`] - Runtime orchestration

pub mod bootstrap;
pub mod config;
pub mod orchestration;
