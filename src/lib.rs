//! Racewatch - live race status tracking.
//!
//! Keeps one consistent view of the active race weekend by reconciling three
//! sources of truth: a local clock that knows the season calendar, a push
//! channel from the race server, and periodic pull cycles (weather, live
//! timing, server health). A single coordinator task owns the state; every
//! producer only proposes changes.
//!
//! # Architecture
//!
//! - **`domain`** - Schedule, status chain, predictions and the committed state
//! - **`port`** - Traits at the seams (push stream, lookups, notifier, clock)
//! - **`application`** - Coordinator, event clock, live channel, pull cycles
//! - **`adapter`** - CLI, WebSocket/REST clients, OpenWeather, notifiers
//! - **`infrastructure`** - Configuration, wiring and task lifecycle
//!
//! # Features
//!
//! - `testkit` - Exposes scripted streams, a manual clock and stub services
//!
//! # Example
//!
//! ```no_run
//! use racewatch::infrastructure::bootstrap::{Collaborators, ConsoleMode};
//! use racewatch::infrastructure::config::Config;
//! use racewatch::infrastructure::orchestration::Services;
//! use racewatch::port::RaceView;
//!
//! # async fn demo() -> racewatch::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let (_shutdown_tx, shutdown) = tokio::sync::watch::channel(false);
//! let collaborators = Collaborators::from_config(&config, ConsoleMode::Off)?;
//! let services = Services::start(&config, collaborators, &shutdown)?;
//! println!("{}", services.handle.snapshot().status);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
