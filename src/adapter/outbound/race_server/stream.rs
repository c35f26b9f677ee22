//! WebSocket push stream to the race server.
//!
//! Holds at most one socket. Text frames are decoded by
//! [`dto::decode_frame`](super::dto::decode_frame); protocol pings are
//! answered here and surface as ignored traffic so the supervisor still sees
//! the connection as alive.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace};

use super::dto::{decode_frame, KeepaliveDto};
use crate::error::{Error, Result};
use crate::port::{ChannelFrame, PushStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Race server push channel over `ws://` or `wss://`.
pub struct WebSocketPushStream {
    url: String,
    ws: Option<Socket>,
}

impl WebSocketPushStream {
    #[must_use]
    pub const fn new(url: String) -> Self {
        Self { url, ws: None }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.ws.is_some()
    }

    fn closed(&mut self, reason: String) -> ChannelFrame {
        self.ws = None;
        ChannelFrame::Closed { reason }
    }
}

#[async_trait]
impl PushStream for WebSocketPushStream {
    async fn connect(&mut self) -> Result<()> {
        // A stale socket from a previous session is dropped, not reused.
        self.ws = None;
        info!(url = %self.url, "Connecting to race server");
        let (ws_stream, response) = connect_async(&self.url).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<ChannelFrame> {
        let ws = self.ws.as_mut()?;

        let received = ws.next().await;
        let Some(received) = received else {
            return Some(self.closed("stream ended".into()));
        };

        match received {
            Ok(Message::Text(text)) => {
                trace!(bytes = text.len(), "Received WebSocket text frame");
                Some(decode_frame(&text))
            }
            Ok(Message::Ping(data)) => {
                trace!("Received WebSocket ping");
                let sent = ws.send(Message::Pong(data)).await;
                if let Err(err) = sent {
                    return Some(self.closed(format!("failed to send pong: {err}")));
                }
                Some(ChannelFrame::Ignored {
                    kind: "ping".into(),
                })
            }
            Ok(Message::Close(frame)) => {
                info!(frame = ?frame, "WebSocket closed by server");
                let reason = frame.map(|f| f.reason.to_string()).unwrap_or_default();
                Some(self.closed(reason))
            }
            Ok(Message::Binary(data)) => Some(ChannelFrame::Malformed {
                reason: format!("unexpected binary frame of {} bytes", data.len()),
            }),
            Ok(_) => Some(ChannelFrame::Ignored {
                kind: "control".into(),
            }),
            Err(err) => {
                error!(error = %err, "WebSocket error");
                Some(self.closed(err.to_string()))
            }
        }
    }

    async fn send_keepalive(&mut self) -> Result<()> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;
        let json = serde_json::to_string(&KeepaliveDto::default())?;
        debug!("Sending keepalive");
        ws.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut ws) = self.ws.take() {
            if let Err(err) = ws.close(None).await {
                debug!(error = %err, "Error while closing WebSocket");
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stream_is_disconnected() {
        let stream = WebSocketPushStream::new("ws://localhost:8000/ws".into());
        assert!(!stream.is_connected());
        assert_eq!(stream.endpoint(), "ws://localhost:8000/ws");
    }

    #[tokio::test]
    async fn disconnected_stream_yields_nothing() {
        let mut stream = WebSocketPushStream::new("ws://localhost:8000/ws".into());
        assert!(stream.next_frame().await.is_none());
        assert!(matches!(
            stream.send_keepalive().await,
            Err(Error::Connection(_))
        ));
        stream.close().await;
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut stream = WebSocketPushStream::new(format!("ws://{addr}/ws"));
        assert!(stream.connect().await.is_err());
        assert!(!stream.is_connected());
    }
}
