//! Trade event row model.

use chrono::{DateTime, Utc};
use curvecopy_core::{EventSource, TradeEvent, TradeSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the append-only `trade_events` log.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TradeEventRecord {
    pub id: i64,
    pub signature: String,
    pub mint: String,
    pub trader: String,
    pub side: String,
    pub token_amount: Decimal,
    pub sol_amount: Decimal,
    pub new_token_balance: Decimal,
    pub curve_key: String,
    pub v_tokens_post: Decimal,
    pub v_sol_post: Decimal,
    pub market_cap_sol: Decimal,
    pub pool: Option<String>,
    pub received_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
}

impl TradeEventRecord {
    /// Rehydrates a pipeline event, tagging it with the given source.
    /// The source tag is runtime-only and never stored.
    #[must_use]
    pub fn into_event(self, source: EventSource) -> TradeEvent {
        TradeEvent {
            id: self.id,
            signature: self.signature,
            mint: self.mint,
            trader: self.trader,
            side: TradeSide::from_tx_type(&self.side),
            token_amount: self.token_amount,
            sol_amount: self.sol_amount,
            new_token_balance: self.new_token_balance,
            curve_key: self.curve_key,
            v_tokens_post: self.v_tokens_post,
            v_sol_post: self.v_sol_post,
            market_cap_sol: self.market_cap_sol,
            pool: self.pool,
            received_at: self.received_at,
            ingested_at: Some(self.ingested_at),
            source,
        }
    }
}
