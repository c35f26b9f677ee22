//! Notifier port for race transitions.
//!
//! The coordinator emits an [`Event`] once per committed transition. Which
//! events reach the user, and how, is up to the registered notifiers.

use tracing::info;

use crate::domain::RoundId;

/// Transitions worth telling the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The active race went live. Emitted once per round.
    RaceLive {
        round: RoundId,
        name: String,
        /// Message supplied by the server, if the push channel caused the edge.
        message: Option<String>,
    },
    /// The active race finished.
    RaceFinished { round: RoundId, name: String },
}

/// Trait for notification handlers.
///
/// `notify` is called from the coordinator's commit loop and must return
/// quickly. Implementations with slow I/O should spawn a task.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// Logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        match event {
            Event::RaceLive {
                round,
                name,
                message,
            } => {
                info!(round = round.get(), race = %name, message = ?message, "Race is live");
            }
            Event::RaceFinished { round, name } => {
                info!(round = round.get(), race = %name, "Race finished");
            }
        }
    }
}
