//! Application services: the synchronization engine.
//!
//! Producers ([`clock::EventClock`], [`channel::LiveChannel`],
//! [`polling::PollingReconciler`], [`refresh::PredictionRefresher`] and the
//! operator via [`handle::RaceHandle`]) submit proposals. The
//! [`coordinator::StateCoordinator`] is the only writer of race state.

pub mod channel;
pub mod clock;
pub mod coordinator;
pub mod handle;
pub mod polling;
pub mod proposal;
pub mod refresh;
pub mod shutdown;
