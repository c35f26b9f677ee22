//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the collaborators the engine talks to: the push
//! channel, request/response lookups, the prediction generator, config
//! persistence, notifications and the clock.

pub mod clock;
pub mod lookup;
pub mod notifier;
pub mod predictor;
pub mod push;
pub mod store;
