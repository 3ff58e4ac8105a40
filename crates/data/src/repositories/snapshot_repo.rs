//! Performance snapshot repository.

use anyhow::Result;
use curvecopy_core::PerformanceSnapshot;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SnapshotRecord;

#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts one snapshot and returns the generated id.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, snapshot: &PerformanceSnapshot) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            INSERT INTO performance_snapshots
                (session_id, taken_at, total_trades, win_count, loss_count,
                 win_rate_percent, avg_roi_percent, total_realized_pnl,
                 total_unrealized_pnl, max_drawdown_percent, sol_balance, total_value)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(snapshot.session_id)
        .bind(snapshot.taken_at)
        .bind(i32::try_from(snapshot.total_trades).unwrap_or(i32::MAX))
        .bind(i32::try_from(snapshot.win_count).unwrap_or(i32::MAX))
        .bind(i32::try_from(snapshot.loss_count).unwrap_or(i32::MAX))
        .bind(snapshot.win_rate_percent)
        .bind(snapshot.avg_roi_percent)
        .bind(snapshot.total_realized_pnl)
        .bind(snapshot.total_unrealized_pnl)
        .bind(snapshot.max_drawdown_percent)
        .bind(snapshot.sol_balance)
        .bind(snapshot.total_value)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// All snapshots of one session, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_by_session(&self, session_id: Uuid) -> Result<Vec<SnapshotRecord>> {
        let records = sqlx::query_as::<_, SnapshotRecord>(
            r"
            SELECT id, session_id, taken_at, total_trades, win_count, loss_count,
                   win_rate_percent, avg_roi_percent, total_realized_pnl,
                   total_unrealized_pnl, max_drawdown_percent, sol_balance, total_value
            FROM performance_snapshots
            WHERE session_id = $1
            ORDER BY taken_at
            ",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
