//! Mock [`PushStream`] implementations for testing.
//!
//! - [`ScriptedPushStream`]: Pre-loaded connect results and frames.
//!   Best for: reconnection, silence detection, keepalive behaviour.
//!
//! - [`ChannelPushStream`]: Channel-backed stream with an external control
//!   handle. Best for: integration tests needing on-demand delivery.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::port::{ChannelFrame, PushMessage, PushStream};

// ---------------------------------------------------------------------------
// ScriptedPushStream
// ---------------------------------------------------------------------------

/// A mock stream with scripted connect results and a fixed frame queue.
///
/// Each `connect()` pops the next result (defaults to `Ok(())` once
/// exhausted). When the frame queue is empty the stream goes quiet:
/// `next_frame()` never resolves, which is how a silent server looks.
pub struct ScriptedPushStream {
    connect_results: VecDeque<Result<()>>,
    frames: VecDeque<ChannelFrame>,
    connected: bool,
    connect_count: Arc<AtomicU32>,
    keepalive_count: Arc<AtomicU32>,
}

impl ScriptedPushStream {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            frames: VecDeque::new(),
            connected: false,
            connect_count: Arc::new(AtomicU32::new(0)),
            keepalive_count: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_frames(mut self, frames: Vec<ChannelFrame>) -> Self {
        self.frames = frames.into();
        self
    }

    /// Shared counter of `connect()` calls.
    pub fn connect_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.connect_count)
    }

    /// Shared counter of keepalives sent.
    pub fn keepalive_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.keepalive_count)
    }
}

impl Default for ScriptedPushStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushStream for ScriptedPushStream {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        let result = self.connect_results.pop_front().unwrap_or(Ok(()));
        self.connected = result.is_ok();
        result
    }

    async fn next_frame(&mut self) -> Option<ChannelFrame> {
        if !self.connected {
            return None;
        }
        match self.frames.pop_front() {
            Some(frame) => {
                if matches!(frame, ChannelFrame::Closed { .. }) {
                    self.connected = false;
                }
                Some(frame)
            }
            None => std::future::pending().await,
        }
    }

    async fn send_keepalive(&mut self) -> Result<()> {
        self.keepalive_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) {
        self.connected = false;
    }

    fn endpoint(&self) -> &str {
        "scripted://push"
    }
}

// ---------------------------------------------------------------------------
// ChannelPushStream
// ---------------------------------------------------------------------------

/// A mock stream fed through a [`ChannelPushHandle`]. No network I/O.
///
/// Keepalives are answered with a `pong` frame, like a well-behaved server.
pub struct ChannelPushStream {
    frame_rx: mpsc::Receiver<ChannelFrame>,
    echo: VecDeque<ChannelFrame>,
    connected: bool,
    connect_count: Arc<AtomicU32>,
}

/// Control handle for a [`ChannelPushStream`].
#[derive(Clone)]
pub struct ChannelPushHandle {
    frame_tx: mpsc::Sender<ChannelFrame>,
    connect_count: Arc<AtomicU32>,
}

impl ChannelPushHandle {
    /// Deliver a decoded message.
    pub async fn send(&self, message: PushMessage) {
        let _ = self.frame_tx.send(ChannelFrame::Message(message)).await;
    }

    /// Deliver a raw frame.
    pub async fn send_frame(&self, frame: ChannelFrame) {
        let _ = self.frame_tx.send(frame).await;
    }

    /// Simulate the server dropping the connection.
    pub async fn drop_connection(&self, reason: &str) {
        let _ = self
            .frame_tx
            .send(ChannelFrame::Closed {
                reason: reason.to_string(),
            })
            .await;
    }

    /// How many times `connect()` was called.
    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }
}

/// Create a [`ChannelPushStream`] and its control [`ChannelPushHandle`].
pub fn channel_push_stream(buffer: usize) -> (ChannelPushStream, ChannelPushHandle) {
    let (tx, rx) = mpsc::channel(buffer);
    let count = Arc::new(AtomicU32::new(0));
    (
        ChannelPushStream {
            frame_rx: rx,
            echo: VecDeque::new(),
            connected: false,
            connect_count: Arc::clone(&count),
        },
        ChannelPushHandle {
            frame_tx: tx,
            connect_count: count,
        },
    )
}

#[async_trait]
impl PushStream for ChannelPushStream {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connected = true;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<ChannelFrame> {
        if !self.connected {
            return None;
        }
        if let Some(frame) = self.echo.pop_front() {
            return Some(frame);
        }
        match self.frame_rx.recv().await {
            Some(frame) => {
                if matches!(frame, ChannelFrame::Closed { .. }) {
                    self.connected = false;
                }
                Some(frame)
            }
            // Handle dropped: behave like a quiet server.
            None => std::future::pending().await,
        }
    }

    async fn send_keepalive(&mut self) -> Result<()> {
        self.echo
            .push_back(ChannelFrame::Message(PushMessage::KeepaliveAck));
        Ok(())
    }

    async fn close(&mut self) {
        self.connected = false;
        self.echo.clear();
    }

    fn endpoint(&self) -> &str {
        "channel://push"
    }
}
