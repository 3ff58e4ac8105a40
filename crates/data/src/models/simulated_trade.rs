//! Simulated trade row model.

use chrono::{DateTime, Utc};
use curvecopy_core::SimulatedTrade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SimulatedTradeRecord {
    pub id: i64,
    pub session_id: Uuid,
    pub source_event_id: i64,
    pub mint: String,
    pub side: String,
    pub sol_amount: Decimal,
    pub token_amount: Decimal,
    pub simulated_price: Decimal,
    pub slippage_bps: Decimal,
    pub delay_ms: i64,
    pub executed_at: DateTime<Utc>,
    pub v_tokens_at_execution: Decimal,
    pub v_sol_at_execution: Decimal,
    pub realized_pnl: Option<Decimal>,
}

impl From<&SimulatedTrade> for SimulatedTradeRecord {
    fn from(trade: &SimulatedTrade) -> Self {
        Self {
            id: 0, // assigned by the database
            session_id: trade.session_id,
            source_event_id: trade.source_event_id,
            mint: trade.mint.clone(),
            side: trade.side.as_str().to_string(),
            sol_amount: trade.sol_amount,
            token_amount: trade.token_amount,
            simulated_price: trade.simulated_price,
            slippage_bps: trade.slippage_bps,
            delay_ms: i64::try_from(trade.delay_ms).unwrap_or(i64::MAX),
            executed_at: trade.executed_at,
            v_tokens_at_execution: trade.v_tokens_at_execution,
            v_sol_at_execution: trade.v_sol_at_execution,
            realized_pnl: trade.realized_pnl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use curvecopy_core::TradeSide;
    use rust_decimal_macros::dec;

    #[test]
    fn record_mirrors_domain_trade() {
        let trade = SimulatedTrade {
            source_event_id: 7,
            session_id: Uuid::nil(),
            mint: "mint-a".to_string(),
            side: TradeSide::Sell,
            sol_amount: dec!(0.95),
            token_amount: dec!(30860215),
            simulated_price: dec!(0.0000000307),
            slippage_bps: dec!(409.12),
            delay_ms: 400,
            executed_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            v_tokens_at_execution: dec!(967741935),
            v_sol_at_execution: dec!(31),
            realized_pnl: Some(dec!(-0.05)),
        };

        let record = SimulatedTradeRecord::from(&trade);

        assert_eq!(record.source_event_id, 7);
        assert_eq!(record.side, "sell");
        assert_eq!(record.delay_ms, 400);
        assert_eq!(record.realized_pnl, Some(dec!(-0.05)));
    }
}
