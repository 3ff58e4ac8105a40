//! Curve-state cache and performance snapshots.
//!
//! The tracker keeps the most recent virtual reserves per mint, updated on
//! every event before any filtering, so later positions can always be marked
//! against the freshest observed curve.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::TradeEvent;
use crate::portfolio::VirtualWallet;
use crate::pricing;

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

#[derive(Debug, Default)]
pub struct MetricsTracker {
    curves: HashMap<String, (Decimal, Decimal)>,
}

impl MetricsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches the post-trade reserves carried on an event. Events with a
    /// degenerate curve are ignored so the cache never poisons pricing.
    pub fn update_curve(&mut self, event: &TradeEvent) {
        if event.has_valid_curve() {
            self.curves.insert(
                event.mint.clone(),
                (event.v_tokens_post, event.v_sol_post),
            );
        }
    }

    /// Spot price for `mint` from the cache, or zero when the mint has not
    /// been observed.
    #[must_use]
    pub fn resolve_current_price(&self, mint: &str) -> Decimal {
        self.curves
            .get(mint)
            .and_then(|&(v_tokens, v_sol)| pricing::spot_price(v_tokens, v_sol).ok())
            .unwrap_or(Decimal::ZERO)
    }

    /// Freezes the wallet and cache into a snapshot.
    #[must_use]
    pub fn take_snapshot(
        &self,
        session_id: Uuid,
        wallet: &VirtualWallet,
        taken_at: DateTime<Utc>,
    ) -> PerformanceSnapshot {
        let settled = wallet.win_count + wallet.loss_count;
        let win_rate_percent = if settled > 0 {
            Decimal::from(wallet.win_count) / Decimal::from(settled) * HUNDRED
        } else {
            Decimal::ZERO
        };
        let avg_roi_percent = if settled > 0 {
            wallet.cumulative_roi_percent / Decimal::from(settled)
        } else {
            Decimal::ZERO
        };

        let price_fn = |mint: &str| self.resolve_current_price(mint);
        PerformanceSnapshot {
            session_id,
            taken_at,
            total_trades: wallet.total_trade_count,
            win_count: wallet.win_count,
            loss_count: wallet.loss_count,
            win_rate_percent,
            avg_roi_percent,
            total_realized_pnl: wallet.total_realized_pnl,
            total_unrealized_pnl: wallet.unrealized_pnl(price_fn),
            max_drawdown_percent: wallet.max_drawdown_percent,
            sol_balance: wallet.sol_balance,
            total_value: wallet.total_value(price_fn),
        }
    }

    /// Clears the curve cache.
    pub fn reset(&mut self) {
        self.curves.clear();
    }

    #[must_use]
    pub fn tracked_mints(&self) -> usize {
        self.curves.len()
    }
}

/// Frozen projection of the wallet and metrics at one moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub session_id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub total_trades: u32,
    pub win_count: u32,
    pub loss_count: u32,
    pub win_rate_percent: Decimal,
    pub avg_roi_percent: Decimal,
    pub total_realized_pnl: Decimal,
    pub total_unrealized_pnl: Decimal,
    pub max_drawdown_percent: Decimal,
    pub sol_balance: Decimal,
    pub total_value: Decimal,
}
