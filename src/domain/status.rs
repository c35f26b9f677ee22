//! Race and connection status values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an event sits in its lifecycle.
///
/// Within one event the status only moves forward along
/// `Upcoming -> Live -> Finished`. Going back to `Upcoming` requires moving
/// to a different event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceStatus {
    #[default]
    Upcoming,
    Live,
    Finished,
}

impl RaceStatus {
    /// Stable lowercase name used in logs and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Finished => "finished",
        }
    }

    /// True when `next` is the immediate successor on the same event's chain.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Upcoming, Self::Live) | (Self::Live, Self::Finished)
        )
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health of the push connection as shown to the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionHealth {
    Connected,
    #[default]
    Disconnected,
}

impl ConnectionHealth {
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_only_moves_forward_one_step() {
        assert!(RaceStatus::Upcoming.can_advance_to(RaceStatus::Live));
        assert!(RaceStatus::Live.can_advance_to(RaceStatus::Finished));
        assert!(!RaceStatus::Upcoming.can_advance_to(RaceStatus::Finished));
        assert!(!RaceStatus::Live.can_advance_to(RaceStatus::Upcoming));
        assert!(!RaceStatus::Finished.can_advance_to(RaceStatus::Live));
        assert!(!RaceStatus::Live.can_advance_to(RaceStatus::Live));
    }

    #[test]
    fn status_uses_lowercase_wire_names() {
        let status: RaceStatus = serde_json::from_str("\"live\"").unwrap();
        assert_eq!(status, RaceStatus::Live);
        assert_eq!(serde_json::to_string(&RaceStatus::Finished).unwrap(), "\"finished\"");
    }
}
