//! Adapters: the CLI on the driving side, network clients and notifiers on
//! the driven side.

pub mod inbound;
pub mod outbound;
