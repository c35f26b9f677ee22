//! Where an update came from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Periodic pull cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Weather,
    Telemetry,
    Probe,
}

impl FeedKind {
    pub const ALL: [Self; 3] = [Self::Weather, Self::Telemetry, Self::Probe];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Telemetry => "telemetry",
            Self::Probe => "probe",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of a proposed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "feed")]
pub enum SourceKind {
    Clock,
    Push,
    Poll(FeedKind),
    Generator,
    Operator,
}

impl SourceKind {
    /// Tie-break rank for updates observed at the same instant; higher wins.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Push => 4,
            Self::Poll(_) => 3,
            Self::Generator => 2,
            Self::Operator => 1,
            Self::Clock => 0,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock => f.write_str("clock"),
            Self::Push => f.write_str("push"),
            Self::Poll(feed) => write!(f, "poll:{feed}"),
            Self::Generator => f.write_str("generator"),
            Self::Operator => f.write_str("operator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_outranks_poll_outranks_generator() {
        let poll = SourceKind::Poll(FeedKind::Telemetry);
        assert!(SourceKind::Push.precedence() > poll.precedence());
        assert!(poll.precedence() > SourceKind::Generator.precedence());
        assert!(SourceKind::Generator.precedence() > SourceKind::Operator.precedence());
    }
}
