//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Outbound ports are implemented by adapters under `adapter::outbound` and
//! injected into the application. Inbound ports are what the CLI (or any
//! other front end) drives.

pub mod inbound;
pub mod outbound;

pub use inbound::race::{RaceControl, RaceView, RefreshOutcome};
pub use outbound::clock::{Clock, SystemClock};
pub use outbound::lookup::{Geocoder, HealthProbe, NullGeocoder, TelemetryService, WeatherService};
pub use outbound::notifier::{Event, LogNotifier, Notifier, NotifierRegistry, NullNotifier};
pub use outbound::predictor::PredictionGenerator;
pub use outbound::push::{ChannelFrame, PushMessage, PushStream};
pub use outbound::store::{ConfigStore, NullConfigStore};
