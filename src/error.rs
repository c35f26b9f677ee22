use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::RoundId;
use crate::domain::status::RaceStatus;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Reasons the coordinator refuses an operator action.
///
/// Rejections are not failures of the system; they tell the operator that the
/// requested transition would break the status chain or the round ordering.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("round {0} is not in the schedule")]
    UnknownRound(RoundId),

    #[error("round {requested} does not advance past the active round {current}")]
    NotForward { current: RoundId, requested: RoundId },

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: RaceStatus, to: RaceStatus },

    #[error("invalid prediction inputs: {0}")]
    InvalidInputs(DomainError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("{operation} timed out after {millis} ms")]
    Timeout { operation: &'static str, millis: u64 },

    /// The collaborator answered, but reported that it has nothing to give.
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: &'static str, reason: String },

    /// The collaborator is already working on a request.
    #[error("{0} is busy")]
    Busy(&'static str),

    #[error("decode error: {0}")]
    Decode(String),

    /// The coordinator task is gone (shutdown in progress).
    #[error("state coordinator stopped")]
    CoordinatorStopped,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}
