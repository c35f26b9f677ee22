//! Infrastructure configuration modules.

pub mod api;
pub mod channel;
pub mod logging;
pub mod polling;
pub mod predictions;
pub mod schedule;
pub mod settings;

pub use settings::Config;
