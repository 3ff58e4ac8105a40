//! Performance snapshot row model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SnapshotRecord {
    pub id: i64,
    pub session_id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub total_trades: i32,
    pub win_count: i32,
    pub loss_count: i32,
    pub win_rate_percent: Decimal,
    pub avg_roi_percent: Decimal,
    pub total_realized_pnl: Decimal,
    pub total_unrealized_pnl: Decimal,
    pub max_drawdown_percent: Decimal,
    pub sol_balance: Decimal,
    pub total_value: Decimal,
}
