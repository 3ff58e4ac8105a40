use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pool sentinel meaning "still trading on the bonding curve".
pub const CURVE_POOL: &str = "pump";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Parses an upstream `txType` value. Anything that is not a
    /// case-insensitive `"buy"` is treated as a sell.
    #[must_use]
    pub fn from_tx_type(tx_type: &str) -> Self {
        if tx_type.eq_ignore_ascii_case("buy") {
            Self::Buy
        } else {
            Self::Sell
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// Where an event entered the pipeline. Runtime-only; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    Live,
    Replay,
}

/// A single observed upstream trade.
///
/// `id` is 0 until the event store assigns one on insert; `ingested_at` is
/// likewise stamped by the store. `(received_at, id)` is the total order the
/// pipeline relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    pub id: i64,
    pub signature: String,
    pub mint: String,
    pub trader: String,
    pub side: TradeSide,
    pub token_amount: Decimal,
    pub sol_amount: Decimal,
    pub new_token_balance: Decimal,
    pub curve_key: String,
    /// Virtual token reserve after this trade.
    pub v_tokens_post: Decimal,
    /// Virtual SOL reserve after this trade.
    pub v_sol_post: Decimal,
    pub market_cap_sol: Decimal,
    pub pool: Option<String>,
    pub received_at: DateTime<Utc>,
    pub ingested_at: Option<DateTime<Utc>>,
    pub source: EventSource,
}

impl TradeEvent {
    /// Returns true while the token still trades on the bonding curve.
    /// An absent `pool` is treated as on-curve.
    #[must_use]
    pub fn is_on_curve(&self) -> bool {
        self.pool.as_deref().map_or(true, |p| p == CURVE_POOL)
    }

    /// Returns true when the post-trade reserves are usable for pricing.
    #[must_use]
    pub fn has_valid_curve(&self) -> bool {
        self.v_tokens_post > Decimal::ZERO && self.v_sol_post > Decimal::ZERO
    }
}

/// What the simulator intends to do in response to one event.
///
/// Buys are sized in SOL, sells in tokens; the two sizes never share a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentKind {
    Buy { sol_in: Decimal },
    Sell { tokens_in: Decimal },
}

impl IntentKind {
    #[must_use]
    pub const fn side(&self) -> TradeSide {
        match self {
            Self::Buy { .. } => TradeSide::Buy,
            Self::Sell { .. } => TradeSide::Sell,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIntent {
    pub mint: String,
    pub kind: IntentKind,
    pub max_slippage_bps: Decimal,
    /// Virtual token reserve carried on the triggering event.
    pub v_tokens: Decimal,
    /// Virtual SOL reserve carried on the triggering event.
    pub v_sol: Decimal,
    pub source_event_id: i64,
    pub delay_ms: u64,
}

impl TradeIntent {
    #[must_use]
    pub const fn side(&self) -> TradeSide {
        self.kind.side()
    }
}

/// Outcome of executing a [`TradeIntent`].
///
/// Rejections (slippage cap, bad curve inputs) are results with
/// `success = false`, not errors: the pipeline logs and moves on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExecutionResult {
    pub success: bool,
    pub actual_token_amount: Decimal,
    pub actual_sol_amount: Decimal,
    pub effective_price: Decimal,
    pub slippage_bps: Decimal,
    pub error_reason: Option<String>,
}

impl TradeExecutionResult {
    #[must_use]
    pub fn filled(
        actual_token_amount: Decimal,
        actual_sol_amount: Decimal,
        slippage_bps: Decimal,
    ) -> Self {
        let effective_price = if actual_token_amount > Decimal::ZERO {
            actual_sol_amount / actual_token_amount
        } else {
            Decimal::ZERO
        };
        Self {
            success: true,
            actual_token_amount,
            actual_sol_amount,
            effective_price,
            slippage_bps,
            error_reason: None,
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>, slippage_bps: Decimal) -> Self {
        Self {
            success: false,
            actual_token_amount: Decimal::ZERO,
            actual_sol_amount: Decimal::ZERO,
            effective_price: Decimal::ZERO,
            slippage_bps,
            error_reason: Some(reason.into()),
        }
    }
}

/// The persisted record of one synthetic fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedTrade {
    pub source_event_id: i64,
    pub session_id: Uuid,
    pub mint: String,
    pub side: TradeSide,
    pub sol_amount: Decimal,
    pub token_amount: Decimal,
    pub simulated_price: Decimal,
    pub slippage_bps: Decimal,
    pub delay_ms: u64,
    pub executed_at: DateTime<Utc>,
    pub v_tokens_at_execution: Decimal,
    pub v_sol_at_execution: Decimal,
    /// Set on sells only.
    pub realized_pnl: Option<Decimal>,
}
