//! Persistence seams for the pipeline.
//!
//! The drivers and the processor talk to storage through these traits so the
//! pipeline can run against in-memory fakes in tests. The production
//! implementations delegate to the repositories in `curvecopy-data`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use curvecopy_core::{PerformanceSnapshot, SimulatedTrade, SimulationSession, TradeEvent};
use curvecopy_data::{
    SessionRepository, SimulatedTradeRepository, SnapshotRepository, TradeEventRepository,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Append-only sink for observed trade events.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends a batch, returning how many rows were actually inserted
    /// (duplicates are skipped, not errors).
    async fn append_batch(&self, events: &[TradeEvent]) -> Result<u64>;
}

/// Unit-granular persistence for sessions, simulated trades and snapshots.
#[async_trait]
pub trait SimulationStore: Send + Sync {
    async fn open_session(&self, session: &SimulationSession) -> Result<()>;
    async fn close_session(
        &self,
        id: Uuid,
        ended_at: DateTime<Utc>,
        final_sol_balance: Decimal,
    ) -> Result<()>;
    async fn record_trade(&self, trade: &SimulatedTrade) -> Result<()>;
    async fn record_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<()>;
}

pub struct PgEventLog {
    events: TradeEventRepository,
}

impl PgEventLog {
    #[must_use]
    pub const fn new(events: TradeEventRepository) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventLog for PgEventLog {
    async fn append_batch(&self, events: &[TradeEvent]) -> Result<u64> {
        self.events.insert_batch(events).await
    }
}

pub struct PgSimulationStore {
    sessions: SessionRepository,
    trades: SimulatedTradeRepository,
    snapshots: SnapshotRepository,
}

impl PgSimulationStore {
    #[must_use]
    pub const fn new(
        sessions: SessionRepository,
        trades: SimulatedTradeRepository,
        snapshots: SnapshotRepository,
    ) -> Self {
        Self {
            sessions,
            trades,
            snapshots,
        }
    }
}

#[async_trait]
impl SimulationStore for PgSimulationStore {
    async fn open_session(&self, session: &SimulationSession) -> Result<()> {
        self.sessions.insert(session).await
    }

    async fn close_session(
        &self,
        id: Uuid,
        ended_at: DateTime<Utc>,
        final_sol_balance: Decimal,
    ) -> Result<()> {
        self.sessions.close(id, ended_at, final_sol_balance).await
    }

    async fn record_trade(&self, trade: &SimulatedTrade) -> Result<()> {
        self.trades.insert(trade).await?;
        Ok(())
    }

    async fn record_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<()> {
        self.snapshots.insert(snapshot).await?;
        Ok(())
    }
}
