//! Row models for the simulator's four tables.
//!
//! All money columns use `rust_decimal::Decimal`; models derive
//! `sqlx::FromRow` for database reads.

pub mod session;
pub mod simulated_trade;
pub mod snapshot;
pub mod trade_event;

pub use session::SessionRecord;
pub use simulated_trade::SimulatedTradeRecord;
pub use snapshot::SnapshotRecord;
pub use trade_event::TradeEventRecord;
