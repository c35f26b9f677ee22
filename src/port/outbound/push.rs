//! Push channel port.
//!
//! A push stream delivers already-decoded server messages. Transport details
//! (framing, TLS, ping/pong) stay inside the adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EventDescriptor, PredictionSet, RaceStatus};
use crate::error::Error;

/// A typed message received from the race server.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    /// Greeting sent right after the socket opens.
    ConnectionEstablished {
        message: String,
        /// The server's view of the active event, when it sends one.
        current_event: Option<EventDescriptor>,
    },
    /// The server moved the active event along its status chain.
    StatusChanged {
        status: RaceStatus,
        message: Option<String>,
    },
    /// The server moved on to another event.
    EventAdvanced { new_event: EventDescriptor },
    /// A complete new prediction set.
    PredictionsUpdated {
        predictions: PredictionSet,
        timestamp: Option<DateTime<Utc>>,
    },
    /// Server-side countdown. Informational only.
    Countdown,
    /// Answer to a keepalive probe.
    KeepaliveAck,
}

impl PushMessage {
    /// Stable name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::StatusChanged { .. } => "race_status",
            Self::EventAdvanced { .. } => "race_progression",
            Self::PredictionsUpdated { .. } => "predictions_update",
            Self::Countdown => "countdown",
            Self::KeepaliveAck => "pong",
        }
    }
}

/// One unit of inbound traffic.
///
/// Every variant except `Closed` counts as proof that the connection is
/// alive, even when the content is useless.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelFrame {
    Message(PushMessage),
    /// A well-formed message of a kind we do not handle.
    Ignored { kind: String },
    /// A frame that could not be decoded. The connection stays open.
    Malformed { reason: String },
    /// The connection ended.
    Closed { reason: String },
}

/// Persistent push connection to the race server.
#[async_trait]
pub trait PushStream: Send {
    /// Open the connection.
    async fn connect(&mut self) -> Result<(), Error>;

    /// Receive the next frame.
    ///
    /// Returns `None` when the stream is not connected.
    async fn next_frame(&mut self) -> Option<ChannelFrame>;

    /// Send the application-level keepalive probe.
    async fn send_keepalive(&mut self) -> Result<(), Error>;

    /// Close the connection. Safe to call when already closed.
    async fn close(&mut self);

    /// Endpoint for logging.
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl PushStream for Box<dyn PushStream> {
    async fn connect(&mut self) -> Result<(), Error> {
        (**self).connect().await
    }

    async fn next_frame(&mut self) -> Option<ChannelFrame> {
        (**self).next_frame().await
    }

    async fn send_keepalive(&mut self) -> Result<(), Error> {
        (**self).send_keepalive().await
    }

    async fn close(&mut self) {
        (**self).close().await;
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}
