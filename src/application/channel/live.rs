//! Supervisor for the single push connection.
//!
//! Connects, forwards decoded messages to the coordinator, sends keepalives
//! and reconnects with backoff. Never writes race state; connection health
//! goes through the coordinator like everything else.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval_at, sleep, sleep_until, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::ChannelSettings;
use crate::application::proposal::{Proposal, ProposalSender, UpdateEnvelope};
use crate::application::shutdown;
use crate::domain::{ConnectionHealth, SourceKind};
use crate::port::{ChannelFrame, Clock, PushStream};

/// Why a connected session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    Dropped,
    CoordinatorGone,
}

pub struct LiveChannel {
    stream: Box<dyn PushStream>,
    clock: Arc<dyn Clock>,
    proposals: ProposalSender,
    settings: ChannelSettings,
    backoff: Backoff,
}

impl LiveChannel {
    pub fn new(
        stream: Box<dyn PushStream>,
        clock: Arc<dyn Clock>,
        proposals: ProposalSender,
        settings: ChannelSettings,
    ) -> Self {
        Self {
            stream,
            clock,
            proposals,
            backoff: Backoff::new(settings.backoff),
            settings,
        }
    }

    /// Keep one connection alive until shutdown.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(endpoint = %self.stream.endpoint(), "Live channel started");
        let mut first_attempt = true;

        loop {
            if !first_attempt {
                let delay = self.backoff.delay_before_attempt();
                info!(
                    delay_ms = delay.as_millis() as u64,
                    attempt = self.backoff.consecutive_failures() + 1,
                    "Reconnecting after delay"
                );
                tokio::select! {
                    biased;
                    () = shutdown::signalled(&mut shutdown) => break,
                    () = sleep(delay) => {}
                }
            }
            first_attempt = false;

            let limit = self.settings.connect_timeout;
            let attempt = tokio::select! {
                biased;
                () = shutdown::signalled(&mut shutdown) => break,
                result = timeout(limit, self.stream.connect()) => result,
            };
            match attempt {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(error = %err, "Push connection failed");
                    self.backoff.record_failure();
                    continue;
                }
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "Push connection timed out");
                    self.backoff.record_failure();
                    continue;
                }
            }

            info!(endpoint = %self.stream.endpoint(), "Push channel connected");
            if !self.report(ConnectionHealth::Connected).await {
                break;
            }

            let end = self.pump(&mut shutdown).await;
            self.stream.close().await;
            // Best effort: during shutdown the coordinator may already be gone.
            let _ = self.report(ConnectionHealth::Disconnected).await;

            match end {
                SessionEnd::Dropped => self.backoff.record_failure(),
                SessionEnd::Shutdown | SessionEnd::CoordinatorGone => break,
            }
        }

        self.stream.close().await;
        info!("Live channel stopped");
    }

    async fn report(&mut self, health: ConnectionHealth) -> bool {
        let envelope = UpdateEnvelope::new(SourceKind::Push, health, self.clock.now());
        self.proposals
            .propose(Proposal::Connection(envelope))
            .await
            .is_ok()
    }

    /// Forward frames until the connection ends.
    async fn pump(&mut self, shutdown: &mut watch::Receiver<bool>) -> SessionEnd {
        let period = self.settings.keepalive_period;
        let silence_limit = self.settings.silence_limit();
        let mut keepalive = interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_traffic = Instant::now();

        loop {
            tokio::select! {
                biased;
                () = shutdown::signalled(shutdown) => return SessionEnd::Shutdown,
                () = sleep_until(last_traffic + silence_limit) => {
                    warn!(
                        silence_ms = silence_limit.as_millis() as u64,
                        "No inbound traffic, dropping connection"
                    );
                    return SessionEnd::Dropped;
                }
                _ = keepalive.tick() => {
                    if let Err(err) = self.stream.send_keepalive().await {
                        warn!(error = %err, "Keepalive failed");
                        return SessionEnd::Dropped;
                    }
                }
                frame = self.stream.next_frame() => {
                    let Some(frame) = frame else {
                        warn!("Push stream ended");
                        return SessionEnd::Dropped;
                    };
                    if let ChannelFrame::Closed { reason } = &frame {
                        warn!(reason = %reason, "Push connection closed");
                        return SessionEnd::Dropped;
                    }

                    last_traffic = Instant::now();
                    if self.backoff.consecutive_failures() > 0 {
                        debug!("Traffic after reconnect, resetting backoff");
                        self.backoff.reset();
                    }

                    if !self.forward(frame).await {
                        return SessionEnd::CoordinatorGone;
                    }
                }
            }
        }
    }

    async fn forward(&mut self, frame: ChannelFrame) -> bool {
        match frame {
            ChannelFrame::Message(message) => {
                debug!(kind = message.kind(), "Push message");
                let envelope = UpdateEnvelope::new(SourceKind::Push, message, self.clock.now());
                self.proposals.propose(Proposal::Push(envelope)).await.is_ok()
            }
            ChannelFrame::Ignored { kind } => {
                debug!(kind = %kind, "Ignoring push message");
                true
            }
            ChannelFrame::Malformed { reason } => {
                warn!(reason = %reason, "Dropping malformed push message");
                true
            }
            ChannelFrame::Closed { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::application::proposal::Submission;
    use crate::domain::RaceStatus;
    use crate::error::Error;
    use crate::port::PushMessage;
    use crate::testkit::clock::ManualClock;
    use crate::testkit::config as test_config;
    use crate::testkit::domain as fixtures;
    use crate::testkit::stream::ScriptedPushStream;

    fn channel(
        stream: ScriptedPushStream,
    ) -> (LiveChannel, mpsc::Receiver<Submission>) {
        let (tx, rx) = mpsc::channel(64);
        let clock = Arc::new(ManualClock::new(fixtures::round_nine_start()));
        let channel = LiveChannel::new(
            Box::new(stream),
            clock,
            ProposalSender::new(tx),
            test_config::channel(),
        );
        (channel, rx)
    }

    async fn next_proposal(rx: &mut mpsc::Receiver<Submission>) -> Proposal {
        rx.recv().await.expect("channel task ended").proposal
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn run_future_can_be_spawned() {
        let (channel, _rx) = channel(ScriptedPushStream::new());
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let run = channel.run(shutdown_rx);
        assert_send(&run);
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_messages_between_health_reports() {
        let live = PushMessage::StatusChanged {
            status: RaceStatus::Live,
            message: None,
        };
        let stream = ScriptedPushStream::new().with_frames(vec![
            ChannelFrame::Ignored {
                kind: "weather_update".into(),
            },
            ChannelFrame::Malformed {
                reason: "not json".into(),
            },
            ChannelFrame::Message(live.clone()),
        ]);
        let (channel, mut rx) = channel(stream);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(channel.run(shutdown_rx));

        assert!(matches!(
            next_proposal(&mut rx).await,
            Proposal::Connection(env) if env.payload == ConnectionHealth::Connected
        ));
        assert!(matches!(
            next_proposal(&mut rx).await,
            Proposal::Push(env) if env.payload == live
        ));

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
        assert!(matches!(
            next_proposal(&mut rx).await,
            Proposal::Connection(env) if env.payload == ConnectionHealth::Disconnected
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn silence_forces_reconnect() {
        let stream = ScriptedPushStream::new();
        let connects = stream.connect_counter();
        let keepalives = stream.keepalive_counter();
        let (channel, mut rx) = channel(stream);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(channel.run(shutdown_rx));

        let mut health = Vec::new();
        while health.len() < 3 {
            if let Proposal::Connection(env) = next_proposal(&mut rx).await {
                health.push(env.payload);
            }
        }

        assert_eq!(
            health,
            vec![
                ConnectionHealth::Connected,
                ConnectionHealth::Disconnected,
                ConnectionHealth::Connected
            ]
        );
        assert!(connects.load(std::sync::atomic::Ordering::SeqCst) >= 2);
        assert!(keepalives.load(std::sync::atomic::Ordering::SeqCst) >= 2);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_connect_is_retried() {
        let stream = ScriptedPushStream::new().with_connect_results(vec![
            Err(Error::Connection("refused".into())),
            Err(Error::Connection("refused".into())),
        ]);
        let connects = stream.connect_counter();
        let (channel, mut rx) = channel(stream);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(channel.run(shutdown_rx));

        assert!(matches!(
            next_proposal(&mut rx).await,
            Proposal::Connection(env) if env.payload == ConnectionHealth::Connected
        ));
        assert_eq!(connects.load(std::sync::atomic::Ordering::SeqCst), 3);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }
}
