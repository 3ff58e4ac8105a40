//! Simulated trade execution.
//!
//! Computes synthetic fills from the reserves carried on the triggering
//! event: constant-product raw fill, deterministic slippage haircut, and a
//! derived effective price. The slippage cap is read from each intent's
//! `max_slippage_bps`, so the same executor honors whatever cap the caller
//! put on the trade. Makes no network calls of any kind.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::events::{IntentKind, TradeExecutionResult, TradeIntent};
use crate::pricing;
use crate::slippage::SlippageModel;
use crate::traits::TradeExecutor;

pub struct SimulatedExecutor {
    slippage: SlippageModel,
}

impl SimulatedExecutor {
    #[must_use]
    pub const fn new(slippage: SlippageModel) -> Self {
        Self { slippage }
    }

    /// Pure fill computation; the async trait wrapper adds nothing on top.
    #[must_use]
    pub fn fill(&self, intent: &TradeIntent) -> TradeExecutionResult {
        match intent.kind {
            IntentKind::Buy { sol_in } => self.fill_buy(intent, sol_in),
            IntentKind::Sell { tokens_in } => self.fill_sell(intent, tokens_in),
        }
    }

    fn fill_buy(&self, intent: &TradeIntent, sol_in: Decimal) -> TradeExecutionResult {
        let raw_tokens = match pricing::tokens_out(sol_in, intent.v_tokens, intent.v_sol) {
            Ok(tokens) => tokens,
            Err(e) => return TradeExecutionResult::rejected(e.to_string(), Decimal::ZERO),
        };

        let total_bps = self.slippage.total_bps(sol_in, intent.v_sol);
        if total_bps > intent.max_slippage_bps {
            return TradeExecutionResult::rejected(
                format!(
                    "slippage {total_bps:.2} bps exceeds cap {}",
                    intent.max_slippage_bps
                ),
                total_bps,
            );
        }

        let actual_tokens = SlippageModel::apply(raw_tokens, total_bps);
        TradeExecutionResult::filled(actual_tokens, sol_in, total_bps)
    }

    fn fill_sell(&self, intent: &TradeIntent, tokens_in: Decimal) -> TradeExecutionResult {
        let raw_sol = match pricing::sol_out(tokens_in, intent.v_tokens, intent.v_sol) {
            Ok(sol) => sol,
            Err(e) => return TradeExecutionResult::rejected(e.to_string(), Decimal::ZERO),
        };

        // Impact is measured by the SOL the sell pulls out of the pool.
        let total_bps = self.slippage.total_bps(raw_sol, intent.v_sol);
        if total_bps > intent.max_slippage_bps {
            return TradeExecutionResult::rejected(
                format!(
                    "slippage {total_bps:.2} bps exceeds cap {}",
                    intent.max_slippage_bps
                ),
                total_bps,
            );
        }

        let actual_sol = SlippageModel::apply(raw_sol, total_bps);
        TradeExecutionResult::filled(tokens_in, actual_sol, total_bps)
    }
}

#[async_trait]
impl TradeExecutor for SimulatedExecutor {
    async fn execute(&self, intent: &TradeIntent) -> Result<TradeExecutionResult> {
        Ok(self.fill(intent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn executor(base: Decimal, factor: Decimal) -> SimulatedExecutor {
        SimulatedExecutor::new(SlippageModel::new(base, factor))
    }

    fn buy_intent(
        sol_in: Decimal,
        v_tokens: Decimal,
        v_sol: Decimal,
        max_slippage_bps: Decimal,
    ) -> TradeIntent {
        TradeIntent {
            mint: "mint-a".to_string(),
            kind: IntentKind::Buy { sol_in },
            max_slippage_bps,
            v_tokens,
            v_sol,
            source_event_id: 1,
            delay_ms: 0,
        }
    }

    fn sell_intent(
        tokens_in: Decimal,
        v_tokens: Decimal,
        v_sol: Decimal,
        max_slippage_bps: Decimal,
    ) -> TradeIntent {
        TradeIntent {
            kind: IntentKind::Sell { tokens_in },
            ..buy_intent(Decimal::ZERO, v_tokens, v_sol, max_slippage_bps)
        }
    }

    #[test]
    fn buy_fill_matches_worked_example() {
        // 1 SOL into (1e9, 30) with base 100 bps, factor 1.0, cap 1000:
        // impact = (1/30)*10000 = 333.33 bps, total = 433.33 bps.
        // Raw tokens = 1e9/31 = 32258064.5; net of slippage ~ 30860215.
        let exec = executor(dec!(100), dec!(1));
        let result = exec.fill(&buy_intent(
            dec!(1),
            dec!(1000000000),
            dec!(30),
            dec!(1000),
        ));

        assert!(result.success);
        assert!((result.slippage_bps - dec!(433.3333333333)).abs() < dec!(0.0001));
        assert!((result.actual_token_amount - dec!(30860215)).abs() < dec!(1));
        assert_eq!(result.actual_sol_amount, dec!(1));
        assert!(result.effective_price > Decimal::ZERO);
    }

    #[test]
    fn buy_over_cap_is_rejected_not_error() {
        // 1 SOL into a 2 SOL pool: impact alone is 5000 bps.
        let exec = executor(dec!(100), dec!(1));
        let result = exec.fill(&buy_intent(dec!(1), dec!(1000000000), dec!(2), dec!(1000)));

        assert!(!result.success);
        assert!(result.slippage_bps > dec!(1000));
        assert!(result
            .error_reason
            .as_deref()
            .is_some_and(|r| r.contains("exceeds cap")));
    }

    #[test]
    fn cap_is_read_from_the_intent() {
        // Identical executor, identical trade; only the intent's cap differs.
        let exec = executor(dec!(100), dec!(1));

        let tight = exec.fill(&buy_intent(dec!(1), dec!(1000000000), dec!(30), dec!(400)));
        let loose = exec.fill(&buy_intent(dec!(1), dec!(1000000000), dec!(30), dec!(500)));

        assert!(!tight.success);
        assert!(loose.success);
    }

    #[test]
    fn zero_cap_rejects_every_trade() {
        let exec = executor(Decimal::ZERO, dec!(1));
        let result = exec.fill(&buy_intent(
            dec!(0.5),
            dec!(1000000000),
            dec!(30),
            Decimal::ZERO,
        ));
        assert!(!result.success);
    }

    #[test]
    fn sell_fill_round_trip_stays_below_entry() {
        // Sell the S1 fill back into the post-buy curve (1e9*30/31, 31).
        let exec = executor(dec!(100), dec!(1));
        let v_tokens = dec!(1000000000) * dec!(30) / dec!(31);
        let result = exec.fill(&sell_intent(dec!(30860215), v_tokens, dec!(31), dec!(1000)));

        assert!(result.success);
        assert_eq!(result.actual_token_amount, dec!(30860215));
        // Raw proceeds just under 1 SOL, minus ~409 bps of slippage.
        assert!(result.actual_sol_amount < dec!(1));
        assert!(result.actual_sol_amount > dec!(0.9));
    }

    #[test]
    fn sell_over_cap_is_rejected() {
        let exec = executor(dec!(100), dec!(1));
        let v_tokens = dec!(1000000000) * dec!(30) / dec!(31);
        let result = exec.fill(&sell_intent(dec!(30860215), v_tokens, dec!(31), dec!(200)));

        assert!(!result.success);
        assert!(result.slippage_bps > dec!(200));
    }

    #[test]
    fn invalid_reserves_reject_with_reason() {
        let exec = executor(dec!(100), dec!(1));
        let result = exec.fill(&buy_intent(dec!(1), Decimal::ZERO, dec!(30), dec!(1000)));

        assert!(!result.success);
        assert!(result
            .error_reason
            .as_deref()
            .is_some_and(|r| r.contains("invalid input")));
    }

    #[tokio::test]
    async fn trait_object_delegates_to_pure_fill() {
        let exec = executor(dec!(100), dec!(1));
        let intent = buy_intent(dec!(1), dec!(1000000000), dec!(30), dec!(1000));

        let via_trait = TradeExecutor::execute(&exec, &intent).await.unwrap();
        let direct = exec.fill(&intent);

        assert_eq!(via_trait.actual_token_amount, direct.actual_token_amount);
        assert_eq!(via_trait.slippage_bps, direct.slippage_bps);
    }
}
