//! The simulation processor.
//!
//! Single reader of the event queue and sole mutator of the wallet. Every
//! event walks the same path: curve cache update, migration filter, per-
//! trader rate limit, optional live delay, intent construction, execution,
//! portfolio mutation, persistence, periodic snapshot. A failure in one
//! event never stops the loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use curvecopy_core::{
    AppConfig, EventSource, IntentKind, MetricsTracker, PerformanceSnapshot, SessionSummary,
    SimulatedTrade, SimulationConfig, SimulationSession, TradeEvent, TradeExecutor, TradeIntent,
    TradeSide, VirtualWallet, WalletTrackingConfig,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::persistence::SimulationStore;
use crate::rate_limit::TraderRateLimiter;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessorStats {
    pub processed: u64,
    pub skipped_migrated: u64,
    pub rate_limited: u64,
    pub skipped_precondition: u64,
    pub rejected: u64,
    pub executed: u64,
}

/// Final state handed back when the queue closes; replay-determinism tests
/// compare these field by field.
pub struct ProcessorOutcome {
    pub wallet: VirtualWallet,
    pub final_snapshot: PerformanceSnapshot,
    pub stats: ProcessorStats,
}

pub struct Processor {
    rx: mpsc::Receiver<TradeEvent>,
    executor: Arc<dyn TradeExecutor>,
    store: Arc<dyn SimulationStore>,
    config: SimulationConfig,
    wallets: WalletTrackingConfig,
    session: SimulationSession,
    wallet: VirtualWallet,
    metrics: MetricsTracker,
    limiter: TraderRateLimiter,
    shutdown: CancellationToken,
    last_snapshot_at: DateTime<Utc>,
    stats: ProcessorStats,
}

impl Processor {
    #[must_use]
    pub fn new(
        config: &AppConfig,
        session: SimulationSession,
        rx: mpsc::Receiver<TradeEvent>,
        executor: Arc<dyn TradeExecutor>,
        store: Arc<dyn SimulationStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let simulation = config.simulation.clone();
        Self {
            rx,
            executor,
            store,
            wallet: VirtualWallet::new(simulation.initial_sol_balance),
            limiter: TraderRateLimiter::new(simulation.max_trades_per_wallet_per_minute),
            config: simulation,
            wallets: config.wallets.clone(),
            last_snapshot_at: session.started_at,
            session,
            metrics: MetricsTracker::new(),
            shutdown,
            stats: ProcessorStats::default(),
        }
    }

    /// Opens the session, drains the queue until it closes, then finalizes.
    /// Cancellation does not interrupt the drain: whatever was enqueued
    /// before the drivers closed the queue is still processed.
    ///
    /// # Errors
    /// Returns an error only when the session row cannot be written at
    /// startup; per-event failures are logged and swallowed.
    pub async fn run(mut self) -> Result<ProcessorOutcome> {
        self.store
            .open_session(&self.session)
            .await
            .context("failed to open simulation session")?;
        tracing::info!(
            session = %self.session.id,
            mode = self.session.mode.as_str(),
            initial = %self.session.initial_sol_balance,
            "simulation session started"
        );

        while let Some(event) = self.rx.recv().await {
            if let Err(e) = self.handle_event(event).await {
                tracing::error!(error = %e, "event processing failed, continuing");
            }
        }

        Ok(self.finalize().await)
    }

    async fn handle_event(&mut self, event: TradeEvent) -> Result<()> {
        self.stats.processed += 1;

        // Curve state feeds pricing for every later mark-to-market, so it is
        // updated before any filtering.
        self.metrics.update_curve(&event);

        if self.config.skip_migrated_tokens && !event.is_on_curve() {
            tracing::debug!(mint = %event.mint, pool = ?event.pool, "skipping migrated token");
            self.stats.skipped_migrated += 1;
            return Ok(());
        }

        if !self.limiter.admit(&event.trader, Utc::now()) {
            tracing::debug!(
                trader = %self.wallets.alias(&event.trader),
                "per-trader rate limit hit, skipping"
            );
            self.stats.rate_limited += 1;
            return Ok(());
        }

        // Live events model the latency of a real copy; replay runs flat out,
        // which is what makes it deterministic and fast.
        let delay_ms = if event.source == EventSource::Live {
            self.config.execution_delay_ms
        } else {
            0
        };
        if delay_ms > 0 {
            tokio::select! {
                () = self.shutdown.cancelled() => {}
                () = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
            }
        }

        let Some(intent) = self.build_intent(&event, delay_ms) else {
            self.stats.skipped_precondition += 1;
            return Ok(());
        };

        let result = self.executor.execute(&intent).await?;
        if !result.success {
            tracing::info!(
                mint = %event.mint,
                side = event.side.as_str(),
                reason = result.error_reason.as_deref().unwrap_or("unknown"),
                "execution rejected"
            );
            self.stats.rejected += 1;
            return Ok(());
        }

        let executed_at = Utc::now();
        let realized_pnl = match intent.kind {
            IntentKind::Buy { .. } => {
                if !self.wallet.record_buy(
                    &event.mint,
                    result.actual_sol_amount,
                    result.actual_token_amount,
                    event.v_sol_post,
                    executed_at,
                ) {
                    self.stats.skipped_precondition += 1;
                    return Ok(());
                }
                None
            }
            IntentKind::Sell { tokens_in } => Some(self.wallet.record_sell(
                &event.mint,
                tokens_in,
                result.actual_sol_amount,
            )),
        };

        let total_value = self
            .wallet
            .total_value(|mint| self.metrics.resolve_current_price(mint));
        self.wallet.update_drawdown(total_value);

        let trade = SimulatedTrade {
            source_event_id: event.id,
            session_id: self.session.id,
            mint: event.mint.clone(),
            side: intent.side(),
            sol_amount: result.actual_sol_amount,
            token_amount: result.actual_token_amount,
            simulated_price: result.effective_price,
            slippage_bps: result.slippage_bps,
            delay_ms,
            executed_at,
            v_tokens_at_execution: event.v_tokens_post,
            v_sol_at_execution: event.v_sol_post,
            realized_pnl,
        };
        self.store
            .record_trade(&trade)
            .await
            .context("failed to persist simulated trade")?;
        self.stats.executed += 1;

        tracing::info!(
            trader = %self.wallets.alias(&event.trader),
            mint = %event.mint,
            side = event.side.as_str(),
            sol = %result.actual_sol_amount,
            tokens = %result.actual_token_amount,
            slippage_bps = %result.slippage_bps,
            pnl = ?realized_pnl,
            balance = %self.wallet.sol_balance,
            "copied trade"
        );

        self.maybe_snapshot(executed_at).await
    }

    fn build_intent(&self, event: &TradeEvent, delay_ms: u64) -> Option<TradeIntent> {
        let kind = match event.side {
            TradeSide::Buy => {
                if self.wallet.sol_balance < self.config.position_size_sol {
                    tracing::debug!(
                        mint = %event.mint,
                        balance = %self.wallet.sol_balance,
                        "insufficient SOL to mirror buy"
                    );
                    return None;
                }
                IntentKind::Buy {
                    sol_in: self.config.position_size_sol,
                }
            }
            TradeSide::Sell => {
                let Some(position) = self.wallet.positions.get(&event.mint) else {
                    tracing::debug!(mint = %event.mint, "no open position to mirror sell");
                    return None;
                };
                IntentKind::Sell {
                    tokens_in: position.token_balance,
                }
            }
        };

        Some(TradeIntent {
            mint: event.mint.clone(),
            kind,
            max_slippage_bps: self.config.max_slippage_bps,
            v_tokens: event.v_tokens_post,
            v_sol: event.v_sol_post,
            source_event_id: event.id,
            delay_ms,
        })
    }

    async fn maybe_snapshot(&mut self, now: DateTime<Utc>) -> Result<()> {
        let interval = chrono::Duration::seconds(
            i64::try_from(self.config.snapshot_interval_seconds).unwrap_or(i64::MAX),
        );
        if now - self.last_snapshot_at < interval {
            return Ok(());
        }

        let snapshot = self.metrics.take_snapshot(self.session.id, &self.wallet, now);
        self.store
            .record_snapshot(&snapshot)
            .await
            .context("failed to persist snapshot")?;
        self.last_snapshot_at = now;
        tracing::debug!(
            total_value = %snapshot.total_value,
            realized = %snapshot.total_realized_pnl,
            "performance snapshot persisted"
        );
        Ok(())
    }

    /// Takes the closing snapshot and writes the session end state.
    /// Best-effort: persistence failures are logged, never raised.
    async fn finalize(mut self) -> ProcessorOutcome {
        let ended_at = Utc::now();
        let final_snapshot = self
            .metrics
            .take_snapshot(self.session.id, &self.wallet, ended_at);

        if let Err(e) = self.store.record_snapshot(&final_snapshot).await {
            tracing::warn!(error = %e, "failed to persist final snapshot");
        }

        self.session.close(ended_at, self.wallet.sol_balance);
        if let Err(e) = self
            .store
            .close_session(self.session.id, ended_at, self.wallet.sol_balance)
            .await
        {
            tracing::warn!(error = %e, "failed to close session row");
        }

        tracing::info!(
            processed = self.stats.processed,
            executed = self.stats.executed,
            rejected = self.stats.rejected,
            rate_limited = self.stats.rate_limited,
            "processor drained"
        );
        tracing::info!("{}", SessionSummary::format(&self.session, &final_snapshot));

        ProcessorOutcome {
            wallet: self.wallet,
            final_snapshot,
            stats: self.stats,
        }
    }
}
