//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`race`]: read access to the committed race state and operator controls

pub mod race;
