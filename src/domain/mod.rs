//! Race domain: schedule, status chain, predictions and the committed state.
//!
//! Nothing in here performs I/O. Constructors validate their inputs and
//! return [`DomainError`] when an invariant would be broken.

pub mod catalog;
pub mod countdown;
pub mod error;
pub mod event;
pub mod id;
pub mod prediction;
pub mod source;
pub mod state;
pub mod status;
pub mod telemetry;
pub mod weather;

pub use catalog::ScheduleCatalog;
pub use countdown::TimeRemaining;
pub use error::DomainError;
pub use event::{parse_timestamp, Coordinates, EventDescriptor};
pub use id::{DriverId, RoundId};
pub use prediction::{Prediction, PredictionInputs, PredictionSet, QualifyingEntry};
pub use source::{FeedKind, SourceKind};
pub use state::{initial_status, CycleStatus, FeedHealth, PredictionsMeta, RaceState};
pub use status::{ConnectionHealth, RaceStatus};
pub use telemetry::{LapSummary, SessionKey, SessionKind, TelemetryReport};
pub use weather::WeatherReport;
