//! Live timing session selection and lap summaries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::RoundId;
use super::prediction::PredictionSet;

/// Session within a race weekend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SessionKind {
    Practice1,
    Practice2,
    Practice3,
    Qualifying,
    Sprint,
    #[default]
    Race,
}

impl SessionKind {
    /// Short code understood by the timing service.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Practice1 => "FP1",
            Self::Practice2 => "FP2",
            Self::Practice3 => "FP3",
            Self::Qualifying => "Q",
            Self::Sprint => "S",
            Self::Race => "R",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FP1" => Ok(Self::Practice1),
            "FP2" => Ok(Self::Practice2),
            "FP3" => Ok(Self::Practice3),
            "Q" => Ok(Self::Qualifying),
            "S" => Ok(Self::Sprint),
            "R" => Ok(Self::Race),
            other => Err(format!("unknown session '{other}'")),
        }
    }
}

impl From<SessionKind> for String {
    fn from(kind: SessionKind) -> Self {
        kind.code().to_string()
    }
}

impl TryFrom<String> for SessionKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Which session the telemetry cycle follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub season: u16,
    pub round: RoundId,
    pub kind: SessionKind,
}

impl SessionKey {
    #[must_use]
    pub const fn new(season: u16, round: RoundId, kind: SessionKind) -> Self {
        Self {
            season,
            round,
            kind,
        }
    }

    /// Same session type for another round.
    #[must_use]
    pub const fn for_round(self, round: RoundId) -> Self {
        Self { round, ..self }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} round {} {}", self.season, self.round, self.kind)
    }
}

/// Condensed view of the lap records published for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapSummary {
    /// Number of lap records received.
    pub lap_count: u32,
    /// Highest lap number seen, if any record carried one.
    pub leader_lap: Option<u32>,
}

/// One successful telemetry poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReport {
    pub laps: LapSummary,
    /// Running order published alongside the laps; absent when the service
    /// has not produced one yet.
    pub predictions: Option<PredictionSet>,
}
