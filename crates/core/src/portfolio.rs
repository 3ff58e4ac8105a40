//! Virtual wallet and position accounting.
//!
//! The wallet is single-owner: only the processor mutates it, which keeps
//! every update totally ordered without locks. Cost basis is volume-weighted
//! across buys; realized PnL on partial sells releases a proportional slice
//! of the basis.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub mint: String,
    pub token_balance: Decimal,
    /// Total SOL spent acquiring the current balance.
    pub total_cost_basis: Decimal,
    /// VWAP entry price: `total_cost_basis / token_balance`.
    pub avg_entry_price: Decimal,
    pub opened_at: DateTime<Utc>,
    /// SOL reserve at first buy; comparative reporting only.
    pub v_sol_at_open: Decimal,
    pub buy_count: u32,
    pub sell_count: u32,
}

impl Position {
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.token_balance <= Decimal::ZERO
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualWallet {
    pub sol_balance: Decimal,
    pub positions: HashMap<String, Position>,
    pub total_realized_pnl: Decimal,
    /// Sum of per-sell ROI percentages; losses contribute negatively.
    pub cumulative_roi_percent: Decimal,
    pub total_trade_count: u32,
    pub win_count: u32,
    pub loss_count: u32,
    pub high_water_mark: Decimal,
    pub max_drawdown_percent: Decimal,
    initial_sol_balance: Decimal,
}

impl VirtualWallet {
    #[must_use]
    pub fn new(initial_sol_balance: Decimal) -> Self {
        Self {
            sol_balance: initial_sol_balance,
            positions: HashMap::new(),
            total_realized_pnl: Decimal::ZERO,
            cumulative_roi_percent: Decimal::ZERO,
            total_trade_count: 0,
            win_count: 0,
            loss_count: 0,
            high_water_mark: initial_sol_balance,
            max_drawdown_percent: Decimal::ZERO,
            initial_sol_balance,
        }
    }

    #[must_use]
    pub const fn initial_sol_balance(&self) -> Decimal {
        self.initial_sol_balance
    }

    /// Records a simulated buy fill.
    ///
    /// Returns false (and mutates nothing) when the wallet cannot cover
    /// `sol_amount`; a buy with the balance exactly equal to the cost
    /// succeeds.
    pub fn record_buy(
        &mut self,
        mint: &str,
        sol_amount: Decimal,
        token_amount: Decimal,
        v_sol_at_open: Decimal,
        now: DateTime<Utc>,
    ) -> bool {
        if self.sol_balance < sol_amount {
            tracing::warn!(
                mint,
                %sol_amount,
                balance = %self.sol_balance,
                "insufficient SOL for buy, skipping"
            );
            return false;
        }

        self.sol_balance -= sol_amount;
        self.total_trade_count += 1;

        if let Some(position) = self.positions.get_mut(mint) {
            position.total_cost_basis += sol_amount;
            position.token_balance += token_amount;
            if position.token_balance > Decimal::ZERO {
                position.avg_entry_price = position.total_cost_basis / position.token_balance;
            }
            position.buy_count += 1;
        } else {
            let avg_entry_price = if token_amount > Decimal::ZERO {
                sol_amount / token_amount
            } else {
                Decimal::ZERO
            };
            self.positions.insert(
                mint.to_string(),
                Position {
                    mint: mint.to_string(),
                    token_balance: token_amount,
                    total_cost_basis: sol_amount,
                    avg_entry_price,
                    opened_at: now,
                    v_sol_at_open,
                    buy_count: 1,
                    sell_count: 0,
                },
            );
        }

        true
    }

    /// Records a simulated sell fill and returns the realized PnL.
    ///
    /// `requested_tokens` is the intent size; `requested_sol` is the
    /// slippage-adjusted SOL the executor produced for that size. Selling
    /// more than the held balance clamps to the balance and scales the SOL
    /// proceeds by the same ratio, preserving the fill rate. With no open
    /// position this is a logged no-op returning zero.
    pub fn record_sell(
        &mut self,
        mint: &str,
        requested_tokens: Decimal,
        requested_sol: Decimal,
    ) -> Decimal {
        let Some(position) = self.positions.get_mut(mint) else {
            tracing::warn!(mint, "sell with no open position, skipping");
            return Decimal::ZERO;
        };

        let sold_tokens = requested_tokens.min(position.token_balance);
        let proportion_sold = if position.token_balance > Decimal::ZERO {
            sold_tokens / position.token_balance
        } else {
            Decimal::ZERO
        };
        let cost_basis_sold = position.total_cost_basis * proportion_sold;
        let actual_sol = if requested_tokens > Decimal::ZERO {
            requested_sol * (sold_tokens / requested_tokens)
        } else {
            Decimal::ZERO
        };
        let realized_pnl = actual_sol - cost_basis_sold;

        self.sol_balance += actual_sol;
        position.token_balance -= sold_tokens;
        position.total_cost_basis -= cost_basis_sold;
        position.sell_count += 1;
        self.total_trade_count += 1;

        self.total_realized_pnl += realized_pnl;
        if realized_pnl > Decimal::ZERO {
            self.win_count += 1;
        } else {
            self.loss_count += 1;
        }
        if cost_basis_sold > Decimal::ZERO {
            self.cumulative_roi_percent += realized_pnl / cost_basis_sold * HUNDRED;
        }

        if position.is_closed() {
            self.positions.remove(mint);
        }

        realized_pnl
    }

    /// Mark-to-market PnL over open positions. `price_fn` resolves the
    /// current spot price per mint; unknown mints should resolve to zero.
    pub fn unrealized_pnl<F>(&self, price_fn: F) -> Decimal
    where
        F: Fn(&str) -> Decimal,
    {
        self.positions
            .values()
            .filter(|p| p.token_balance > Decimal::ZERO)
            .map(|p| p.token_balance * price_fn(&p.mint) - p.total_cost_basis)
            .sum()
    }

    /// SOL balance plus the marked value of every open position.
    pub fn total_value<F>(&self, price_fn: F) -> Decimal
    where
        F: Fn(&str) -> Decimal,
    {
        let marked: Decimal = self
            .positions
            .values()
            .map(|p| p.token_balance * price_fn(&p.mint))
            .sum();
        self.sol_balance + marked
    }

    /// Advances the high-water mark and the max drawdown.
    pub fn update_drawdown(&mut self, current_value: Decimal) {
        if current_value > self.high_water_mark {
            self.high_water_mark = current_value;
        }
        if self.high_water_mark > Decimal::ZERO {
            let dd_pct =
                (self.high_water_mark - current_value) / self.high_water_mark * HUNDRED;
            if dd_pct > self.max_drawdown_percent {
                self.max_drawdown_percent = dd_pct;
            }
        }
    }

    /// Discards all state and restarts from `initial`.
    pub fn reset(&mut self, initial: Decimal) {
        *self = Self::new(initial);
    }
}
