//! Outbound adapters (driven side).

pub mod http;
pub mod notifier;
pub mod openweather;
pub mod predictor;
pub mod race_server;
