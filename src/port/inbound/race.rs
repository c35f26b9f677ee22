//! Race view and control port for operator-facing adapters.
//!
//! Keeps front ends (the CLI today) decoupled from the coordinator. Reads
//! always see a whole committed [`RaceState`]; controls are proposals that the
//! coordinator may reject.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{QualifyingEntry, RaceState, RoundId, SessionKey, TimeRemaining};
use crate::error::Error;

/// Result of asking for a prediction refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A refresh was started in the background.
    Started,
    /// A refresh is already in flight; nothing was started.
    Skipped,
}

/// Read-only access to the committed state.
pub trait RaceView: Send + Sync {
    /// Latest committed state.
    fn snapshot(&self) -> RaceState;

    /// Receiver woken on every commit.
    fn subscribe(&self) -> watch::Receiver<RaceState>;

    /// Time until the active event starts, by the injected clock.
    fn countdown(&self) -> TimeRemaining;
}

/// Operator controls.
///
/// Each method resolves once the coordinator has decided. `Ok(true)` means
/// the state changed, `Ok(false)` that it was already as requested.
#[async_trait]
pub trait RaceControl: Send + Sync {
    fn request_prediction_refresh(&self) -> RefreshOutcome;

    async fn mark_finished(&self) -> Result<bool, Error>;

    async fn advance_to(&self, round: RoundId) -> Result<bool, Error>;

    async fn reset_season(&self) -> Result<bool, Error>;

    /// Geocode `location` and move the active event there. `Ok(false)` when
    /// the text is too short to look up or nothing matched.
    async fn relocate(&self, location: &str) -> Result<bool, Error>;

    async fn update_qualifying(&self, entries: Vec<QualifyingEntry>) -> Result<bool, Error>;

    async fn update_team_points(&self, points: BTreeMap<String, f64>) -> Result<bool, Error>;

    async fn set_session(&self, session: SessionKey) -> Result<bool, Error>;
}
