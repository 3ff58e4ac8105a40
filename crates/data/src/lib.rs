pub mod database;
pub mod models;
pub mod repositories;
pub mod schema;

pub use database::DatabaseClient;
pub use models::{SessionRecord, SimulatedTradeRecord, SnapshotRecord, TradeEventRecord};
pub use repositories::{
    Repositories, SessionRepository, SimulatedTradeRepository, SnapshotRepository,
    TradeEventRepository,
};
