//! Live ingest driver.
//!
//! Walks the connection state machine, reads events off the feed, batches
//! them for the event log and fans each one into the processor queue. A
//! failed flush drops the batch and keeps the pipeline moving; the unique
//! signature index makes a later redelivery harmless.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use curvecopy_core::{AppConfig, TradeEvent};
use curvecopy_feed::{FeedClient, ReconnectBackoff};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::persistence::EventLog;

const DEFAULT_BATCH_SIZE: usize = 50;
const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngestState {
    Disconnected,
    Connecting,
    Subscribed,
    Receiving,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    pub received: u64,
    pub enqueued: u64,
    pub persisted: u64,
    pub dropped_batches: u64,
}

enum Step {
    Cancelled,
    FlushDue,
    Received(Option<TradeEvent>),
    Failed(anyhow::Error),
}

pub struct IngestDriver {
    client: FeedClient,
    event_log: Arc<dyn EventLog>,
    tx: mpsc::Sender<TradeEvent>,
    shutdown: CancellationToken,
    tracked_wallets: Vec<String>,
    backoff: ReconnectBackoff,
    batch_size: usize,
    flush_interval: Duration,
    state: IngestState,
    next_sequence: i64,
    stats: IngestStats,
}

impl IngestDriver {
    #[must_use]
    pub fn new(
        config: &AppConfig,
        client: FeedClient,
        event_log: Arc<dyn EventLog>,
        tx: mpsc::Sender<TradeEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        let ws = &config.websocket;
        Self {
            client,
            event_log,
            tx,
            shutdown,
            tracked_wallets: config.wallets.wallet_keys(),
            backoff: ReconnectBackoff::new(
                Duration::from_millis(ws.reconnect_base_delay_ms),
                Duration::from_millis(ws.reconnect_max_delay_ms),
                ws.reconnect_jitter_factor,
            ),
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            state: IngestState::Disconnected,
            next_sequence: 1,
            stats: IngestStats::default(),
        }
    }

    /// Overrides the flush parameters; used by tests.
    #[must_use]
    pub const fn with_batching(mut self, batch_size: usize, flush_interval: Duration) -> Self {
        self.batch_size = batch_size;
        self.flush_interval = flush_interval;
        self
    }

    /// Runs until cancelled or until the queue closes. Dropping the sender
    /// at return is what closes the queue for the processor.
    pub async fn run(mut self) -> Result<IngestStats> {
        let mut batch: Vec<TradeEvent> = Vec::with_capacity(self.batch_size);

        'session: loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            self.transition(IngestState::Connecting);
            match self.client.connect_and_subscribe(&self.tracked_wallets).await {
                Ok(()) => {
                    self.backoff.reset();
                    self.transition(IngestState::Subscribed);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "feed connect failed");
                    self.transition(IngestState::Disconnected);
                    if !self.sleep_backoff().await {
                        break;
                    }
                    continue;
                }
            }

            self.transition(IngestState::Receiving);
            let mut last_flush = tokio::time::Instant::now();

            loop {
                let remaining = self
                    .flush_interval
                    .saturating_sub(last_flush.elapsed());

                let step = tokio::select! {
                    () = self.shutdown.cancelled() => Step::Cancelled,
                    received = tokio::time::timeout(remaining, self.client.receive()) => {
                        match received {
                            Err(_) => Step::FlushDue,
                            Ok(Ok(event)) => Step::Received(event),
                            Ok(Err(e)) => Step::Failed(e),
                        }
                    }
                };

                match step {
                    Step::Cancelled => {
                        tracing::info!("shutdown requested, flushing pending batch");
                        self.flush(&mut batch).await;
                        break 'session;
                    }
                    Step::FlushDue => {
                        self.flush(&mut batch).await;
                        last_flush = tokio::time::Instant::now();
                    }
                    Step::Received(None) => {}
                    Step::Received(Some(mut event)) => {
                        // The store assigns its own key on insert; the queue
                        // copy gets a process-local sequence so every observed
                        // event has a distinct id downstream.
                        event.id = self.next_sequence;
                        self.next_sequence += 1;
                        self.stats.received += 1;

                        batch.push(event.clone());
                        if batch.len() >= self.batch_size {
                            self.flush(&mut batch).await;
                            last_flush = tokio::time::Instant::now();
                        }

                        if self.tx.send(event).await.is_err() {
                            tracing::warn!("event queue closed, stopping ingest");
                            self.flush(&mut batch).await;
                            break 'session;
                        }
                        self.stats.enqueued += 1;
                    }
                    Step::Failed(e) => {
                        tracing::warn!(error = %e, "feed receive failed, reconnecting");
                        self.transition(IngestState::Disconnected);
                        // Flush before sleeping so a long backoff cannot
                        // strand a partial batch in memory.
                        self.flush(&mut batch).await;
                        if !self.sleep_backoff().await {
                            break 'session;
                        }
                        continue 'session;
                    }
                }
            }
        }

        tracing::info!(
            received = self.stats.received,
            enqueued = self.stats.enqueued,
            persisted = self.stats.persisted,
            dropped_batches = self.stats.dropped_batches,
            "ingest driver stopped"
        );
        Ok(self.stats)
    }

    async fn flush(&mut self, batch: &mut Vec<TradeEvent>) {
        if batch.is_empty() {
            return;
        }
        match self.event_log.append_batch(batch).await {
            Ok(inserted) => {
                self.stats.persisted += inserted;
                tracing::debug!(batch = batch.len(), inserted, "flushed event batch");
            }
            Err(e) => {
                self.stats.dropped_batches += 1;
                tracing::error!(
                    error = %e,
                    batch = batch.len(),
                    "dropping event batch after failed flush"
                );
            }
        }
        batch.clear();
    }

    /// Sleeps the backoff delay; returns false when cancelled mid-sleep.
    async fn sleep_backoff(&mut self) -> bool {
        let delay = self.backoff.next_delay();
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt = self.backoff.attempt(),
            "waiting before reconnect"
        );
        tokio::select! {
            () = self.shutdown.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }

    fn transition(&mut self, next: IngestState) {
        if self.state != next {
            tracing::info!(from = ?self.state, to = ?next, "ingest state change");
            self.state = next;
        }
    }
}
