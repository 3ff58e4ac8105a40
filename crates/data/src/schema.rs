//! Embedded schema definition.
//!
//! Applied idempotently at startup; every statement is `IF NOT EXISTS` so a
//! restart against an existing database is a no-op.

pub const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS trade_events (
        id BIGSERIAL PRIMARY KEY,
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
        received_at TIMESTAMPTZ NOT NULL,
        ingested_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_trade_events_signature
        ON trade_events (signature)
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_trade_events_trader_received
        ON trade_events (trader, received_at)
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_trade_events_mint
        ON trade_events (mint)
    ",
    r"
    CREATE TABLE IF NOT EXISTS simulation_sessions (
        id UUID PRIMARY KEY,
        started_at TIMESTAMPTZ NOT NULL,
        ended_at TIMESTAMPTZ,
        mode TEXT NOT NULL,
        config_json JSONB NOT NULL,
        initial_sol_balance NUMERIC(18, 9) NOT NULL,
        final_sol_balance NUMERIC(18, 9)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS simulated_trades (
        id BIGSERIAL PRIMARY KEY,
        session_id UUID NOT NULL REFERENCES simulation_sessions (id),
        source_event_id BIGINT NOT NULL,
        mint TEXT NOT NULL,
        side TEXT NOT NULL,
        sol_amount NUMERIC(18, 9) NOT NULL,
        token_amount NUMERIC(28, 12) NOT NULL,
        simulated_price NUMERIC(28, 18) NOT NULL,
        slippage_bps NUMERIC(8, 2) NOT NULL,
        delay_ms BIGINT NOT NULL,
        executed_at TIMESTAMPTZ NOT NULL,
        v_tokens_at_execution NUMERIC(28, 12) NOT NULL,
        v_sol_at_execution NUMERIC(18, 9) NOT NULL,
        realized_pnl NUMERIC(18, 9)
    )
    ",
    r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_simulated_trades_session_event
        ON simulated_trades (session_id, source_event_id)
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_simulated_trades_mint
        ON simulated_trades (mint)
    ",
    r"
    CREATE TABLE IF NOT EXISTS performance_snapshots (
        id BIGSERIAL PRIMARY KEY,
        session_id UUID NOT NULL REFERENCES simulation_sessions (id),
        taken_at TIMESTAMPTZ NOT NULL,
        total_trades INTEGER NOT NULL,
        win_count INTEGER NOT NULL,
        loss_count INTEGER NOT NULL,
        win_rate_percent NUMERIC(8, 4) NOT NULL,
        avg_roi_percent NUMERIC(8, 4) NOT NULL,
        total_realized_pnl NUMERIC(18, 9) NOT NULL,
        total_unrealized_pnl NUMERIC(18, 9) NOT NULL,
        max_drawdown_percent NUMERIC(8, 4) NOT NULL,
        sol_balance NUMERIC(18, 9) NOT NULL,
        total_value NUMERIC(18, 9) NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_performance_snapshots_session
        ON performance_snapshots (session_id, taken_at)
    ",
];
