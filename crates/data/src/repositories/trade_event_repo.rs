//! Append-only trade event log.
//!
//! The hot path is `insert_batch`: events are bulk-loaded with the COPY
//! protocol into a transaction-scoped scratch table, then moved into the
//! permanent table in one insert that silently skips duplicate signatures.
//! Reads are forward-only cursor streams ordered by `(received_at, id)`.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use curvecopy_core::TradeEvent;
use futures_util::stream::BoxStream;
use sqlx::PgPool;

use crate::models::TradeEventRecord;

#[derive(Debug, Clone)]
pub struct TradeEventRepository {
    pool: PgPool,
}

impl TradeEventRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bulk-inserts a batch of events, preserving their order for id
    /// assignment. Duplicate signatures (within the batch or against the
    /// table) are silently skipped. Returns the number of rows actually
    /// inserted.
    ///
    /// # Errors
    /// Returns an error if the COPY or the final insert fails; the whole
    /// batch rolls back in that case.
    pub async fn insert_batch(&self, events: &[TradeEvent]) -> Result<u64> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.context("begin batch insert")?;

        sqlx::query(
            r"
            CREATE TEMP TABLE trade_events_load (
                ord BIGINT NOT NULL,
                signature TEXT NOT NULL,
                mint TEXT NOT NULL,
                trader TEXT NOT NULL,
                side TEXT NOT NULL,
                token_amount NUMERIC(28, 12) NOT NULL,
                sol_amount NUMERIC(18, 9) NOT NULL,
                new_token_balance NUMERIC(28, 12) NOT NULL,
                curve_key TEXT NOT NULL,
                v_tokens_post NUMERIC(28, 12) NOT NULL,
                v_sol_post NUMERIC(18, 9) NOT NULL,
                market_cap_sol NUMERIC(18, 9) NOT NULL,
                pool TEXT,
                received_at TIMESTAMPTZ NOT NULL
            ) ON COMMIT DROP
            ",
        )
        .execute(&mut *tx)
        .await
        .context("create scratch table")?;

        let payload = copy_payload(events);
        let mut copy = tx
            .copy_in_raw(
                "COPY trade_events_load (ord, signature, mint, trader, side, token_amount, \
                 sol_amount, new_token_balance, curve_key, v_tokens_post, v_sol_post, \
                 market_cap_sol, pool, received_at) FROM STDIN",
            )
            .await
            .context("open copy stream")?;
        copy.send(payload.as_bytes())
            .await
            .context("send copy payload")?;
        copy.finish().await.context("finish copy stream")?;

        let result = sqlx::query(
            r"
            INSERT INTO trade_events
                (signature, mint, trader, side, token_amount, sol_amount, new_token_balance,
                 curve_key, v_tokens_post, v_sol_post, market_cap_sol, pool, received_at)
            SELECT signature, mint, trader, side, token_amount, sol_amount, new_token_balance,
                   curve_key, v_tokens_post, v_sol_post, market_cap_sol, pool, received_at
            FROM trade_events_load
            ORDER BY ord
            ON CONFLICT (signature) DO NOTHING
            ",
        )
        .execute(&mut *tx)
        .await
        .context("insert from scratch table")?;

        tx.commit().await.context("commit batch insert")?;
        Ok(result.rows_affected())
    }

    /// Streams events with `received_at` in `[from, to]`, ordered by
    /// `(received_at, id)`. Cursor-backed: rows are fetched as the stream is
    /// polled and the full range is never materialized. Dropping the stream
    /// cancels the read.
    pub fn stream_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxStream<'_, sqlx::Result<TradeEventRecord>> {
        sqlx::query_as::<_, TradeEventRecord>(
            r"
            SELECT id, signature, mint, trader, side, token_amount, sol_amount,
                   new_token_balance, curve_key, v_tokens_post, v_sol_post, market_cap_sol,
                   pool, received_at, ingested_at
            FROM trade_events
            WHERE received_at >= $1 AND received_at <= $2
            ORDER BY received_at, id
            ",
        )
        .bind(from)
        .bind(to)
        .fetch(&self.pool)
    }

    /// Same as [`Self::stream_range`], additionally filtered by trader.
    pub fn stream_by_trader(
        &self,
        trader: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxStream<'_, sqlx::Result<TradeEventRecord>> {
        sqlx::query_as::<_, TradeEventRecord>(
            r"
            SELECT id, signature, mint, trader, side, token_amount, sol_amount,
                   new_token_balance, curve_key, v_tokens_post, v_sol_post, market_cap_sol,
                   pool, received_at, ingested_at
            FROM trade_events
            WHERE trader = $1 AND received_at >= $2 AND received_at <= $3
            ORDER BY received_at, id
            ",
        )
        .bind(trader.to_string())
        .bind(from)
        .bind(to)
        .fetch(&self.pool)
    }

    /// Number of events in a time range; used for replay progress logging.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM trade_events
            WHERE received_at >= $1 AND received_at <= $2
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}

/// Renders a batch in COPY text format: tab-separated fields, `\N` for
/// NULL, one row per line, with an explicit ordinal so the insert keeps
/// the batch order.
fn copy_payload(events: &[TradeEvent]) -> String {
    let mut payload = String::with_capacity(events.len() * 256);
    for (ord, event) in events.iter().enumerate() {
        payload.push_str(&ord.to_string());
        for field in [
            event.signature.as_str(),
            event.mint.as_str(),
            event.trader.as_str(),
            event.side.as_str(),
        ] {
            payload.push('\t');
            push_escaped(&mut payload, field);
        }
        for value in [
            event.token_amount,
            event.sol_amount,
            event.new_token_balance,
        ] {
            payload.push('\t');
            payload.push_str(&value.to_string());
        }
        payload.push('\t');
        push_escaped(&mut payload, &event.curve_key);
        for value in [event.v_tokens_post, event.v_sol_post, event.market_cap_sol] {
            payload.push('\t');
            payload.push_str(&value.to_string());
        }
        payload.push('\t');
        match &event.pool {
            Some(pool) => push_escaped(&mut payload, pool),
            None => payload.push_str("\\N"),
        }
        payload.push('\t');
        payload.push_str(
            &event
                .received_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        );
        payload.push('\n');
    }
    payload
}

/// Escapes a text field for COPY text format.
fn push_escaped(payload: &mut String, field: &str) {
    for c in field.chars() {
        match c {
            '\\' => payload.push_str("\\\\"),
            '\t' => payload.push_str("\\t"),
            '\n' => payload.push_str("\\n"),
            '\r' => payload.push_str("\\r"),
            _ => payload.push(c),
        }
    }
}
