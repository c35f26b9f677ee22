//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`]: [`ManualClock`](clock::ManualClock), a clock moved by hand.
//! - [`stream`]: Mock [`PushStream`](crate::port::PushStream)
//!   implementations: `ScriptedPushStream`, `ChannelPushStream`.
//! - [`services`]: Stub pull collaborators, a gated prediction generator and
//!   a recording config store.
//! - [`domain`]: Builders for domain values: catalog, predictions, weather.
//! - [`config`]: Canonical fast test configurations and the engine config.

pub mod clock;
pub mod config;
pub mod domain;
pub mod services;
pub mod stream;
