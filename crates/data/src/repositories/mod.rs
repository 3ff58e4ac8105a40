//! Database repositories for the copy-trading simulator.
//!
//! Each repository provides typed access to a specific table; the event log
//! additionally carries the COPY-based bulk insert path and the cursor
//! streams the replay driver reads from.

pub mod session_repo;
pub mod simulated_trade_repo;
pub mod snapshot_repo;
pub mod trade_event_repo;

pub use session_repo::SessionRepository;
pub use simulated_trade_repo::SimulatedTradeRepository;
pub use snapshot_repo::SnapshotRepository;
pub use trade_event_repo::TradeEventRepository;

use sqlx::PgPool;

/// Creates all repositories from a single database pool.
pub struct Repositories {
    pub trade_events: TradeEventRepository,
    pub simulated_trades: SimulatedTradeRepository,
    pub sessions: SessionRepository,
    pub snapshots: SnapshotRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            trade_events: TradeEventRepository::new(pool.clone()),
            simulated_trades: SimulatedTradeRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            snapshots: SnapshotRepository::new(pool),
        }
    }
}
