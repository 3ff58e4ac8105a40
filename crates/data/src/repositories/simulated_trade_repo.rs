//! Simulated trade repository.

use anyhow::Result;
use curvecopy_core::SimulatedTrade;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SimulatedTradeRecord;

#[derive(Debug, Clone)]
pub struct SimulatedTradeRepository {
    pool: PgPool,
}

impl SimulatedTradeRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts one simulated trade and returns the generated id.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, trade: &SimulatedTrade) -> Result<i64> {
        let record = SimulatedTradeRecord::from(trade);
        let row: (i64,) = sqlx::query_as(
            r"
            INSERT INTO simulated_trades
                (session_id, source_event_id, mint, side, sol_amount, token_amount,
                 simulated_price, slippage_bps, delay_ms, executed_at,
                 v_tokens_at_execution, v_sol_at_execution, realized_pnl)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            ",
        )
        .bind(record.session_id)
        .bind(record.source_event_id)
        .bind(&record.mint)
        .bind(&record.side)
        .bind(record.sol_amount)
        .bind(record.token_amount)
        .bind(record.simulated_price)
        .bind(record.slippage_bps)
        .bind(record.delay_ms)
        .bind(record.executed_at)
        .bind(record.v_tokens_at_execution)
        .bind(record.v_sol_at_execution)
        .bind(record.realized_pnl)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// All trades of one session in execution order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_by_session(&self, session_id: Uuid) -> Result<Vec<SimulatedTradeRecord>> {
        let records = sqlx::query_as::<_, SimulatedTradeRecord>(
            r"
            SELECT id, session_id, source_event_id, mint, side, sol_amount, token_amount,
                   simulated_price, slippage_bps, delay_ms, executed_at,
                   v_tokens_at_execution, v_sol_at_execution, realized_pnl
            FROM simulated_trades
            WHERE session_id = $1
            ORDER BY executed_at, id
            ",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
