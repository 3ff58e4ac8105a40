//! Replay driver.
//!
//! Re-drives the simulation from the persisted event log: streams the
//! configured time range in `(received_at, id)` order, applies the optional
//! wallet allowlist in memory, tags every event as replay and enqueues it.
//! Closing the queue at the end is what tells the processor to drain and
//! finalize.

use anyhow::{Context, Result};
use curvecopy_core::{EventSource, ReplayConfig, TradeEvent};
use curvecopy_data::TradeEventRepository;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayStats {
    pub read: u64,
    pub enqueued: u64,
    pub filtered: u64,
}

pub struct ReplayDriver {
    events: TradeEventRepository,
    config: ReplayConfig,
    tx: mpsc::Sender<TradeEvent>,
    shutdown: CancellationToken,
}

impl ReplayDriver {
    #[must_use]
    pub const fn new(
        events: TradeEventRepository,
        config: ReplayConfig,
        tx: mpsc::Sender<TradeEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            events,
            config,
            tx,
            shutdown,
        }
    }

    /// Streams the configured range into the queue.
    ///
    /// # Errors
    /// Returns an error when the range endpoints are missing or a read from
    /// the event log fails.
    pub async fn run(self) -> Result<ReplayStats> {
        let from = self.config.from.context("replay.from is not configured")?;
        let to = self.config.to.context("replay.to is not configured")?;

        let total = self.events.count_range(from, to).await?;
        tracing::info!(%from, %to, total, "replay starting");

        let stream = self
            .events
            .stream_range(from, to)
            .map(|row| {
                row.map(|record| record.into_event(EventSource::Replay))
                    .map_err(anyhow::Error::from)
            })
            .boxed();

        let stats = pump(
            stream,
            &self.config.filter_wallets,
            self.config.batch_size.max(1),
            &self.tx,
            &self.shutdown,
        )
        .await?;

        tracing::info!(
            read = stats.read,
            enqueued = stats.enqueued,
            filtered = stats.filtered,
            "replay finished, closing queue"
        );
        Ok(stats)
    }
}

/// Drives a stream of events into the queue. Factored out of the driver so
/// the enqueue semantics are testable without a database.
pub async fn pump<S>(
    mut stream: S,
    filter_wallets: &[String],
    progress_every: usize,
    tx: &mpsc::Sender<TradeEvent>,
    shutdown: &CancellationToken,
) -> Result<ReplayStats>
where
    S: Stream<Item = Result<TradeEvent>> + Unpin,
{
    let mut stats = ReplayStats::default();

    while let Some(row) = stream.next().await {
        if shutdown.is_cancelled() {
            tracing::info!("replay cancelled");
            break;
        }

        let mut event = row.context("failed to read event from log")?;
        event.source = EventSource::Replay;
        stats.read += 1;

        if !filter_wallets.is_empty() && !filter_wallets.contains(&event.trader) {
            stats.filtered += 1;
            continue;
        }

        if tx.send(event).await.is_err() {
            tracing::warn!("event queue closed, stopping replay");
            break;
        }
        stats.enqueued += 1;

        if stats.read % progress_every as u64 == 0 {
            tracing::debug!(read = stats.read, enqueued = stats.enqueued, "replay progress");
        }
    }

    Ok(stats)
}
