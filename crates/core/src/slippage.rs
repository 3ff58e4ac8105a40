//! Deterministic slippage model.
//!
//! Total slippage is a configured base plus a depth-relative impact term:
//! `impact_bps = (sol_amount / v_sol) * price_impact_factor * 10000`.
//! The rejection cap is not part of the model: it rides on each
//! [`TradeIntent`](crate::events::TradeIntent) and the executor compares
//! against it. There is no random component; identical inputs always produce
//! identical fills.

use rust_decimal::Decimal;

use crate::config::SimulationConfig;

const BPS_DENOMINATOR: Decimal = Decimal::from_parts(10000, 0, 0, false, 0);

#[derive(Debug, Clone)]
pub struct SlippageModel {
    base_bps: Decimal,
    price_impact_factor: Decimal,
}

impl SlippageModel {
    #[must_use]
    pub const fn new(base_bps: Decimal, price_impact_factor: Decimal) -> Self {
        Self {
            base_bps,
            price_impact_factor,
        }
    }

    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.base_slippage_bps, config.price_impact_factor)
    }

    /// Depth-relative impact in bps. Zero when the SOL reserve is not
    /// positive, so a degenerate curve falls back to the base slippage.
    #[must_use]
    pub fn impact_bps(&self, sol_amount: Decimal, v_sol: Decimal) -> Decimal {
        if v_sol <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        sol_amount / v_sol * self.price_impact_factor * BPS_DENOMINATOR
    }

    /// Uncapped total slippage for a trade of `sol_amount` against a pool
    /// holding `v_sol`. The executor rejects the intent when this exceeds
    /// the intent's `max_slippage_bps`.
    #[must_use]
    pub fn total_bps(&self, sol_amount: Decimal, v_sol: Decimal) -> Decimal {
        self.base_bps + self.impact_bps(sol_amount, v_sol)
    }

    /// Shrinks a raw fill by `bps`: `amount * (1 - bps / 10000)`.
    #[must_use]
    pub fn apply(amount: Decimal, bps: Decimal) -> Decimal {
        amount * (Decimal::ONE - bps / BPS_DENOMINATOR)
    }
}
