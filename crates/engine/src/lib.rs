pub mod ingest;
pub mod persistence;
pub mod processor;
pub mod rate_limit;
pub mod replay;

pub use ingest::{IngestDriver, IngestStats};
pub use persistence::{EventLog, PgEventLog, PgSimulationStore, SimulationStore};
pub use processor::{Processor, ProcessorOutcome, ProcessorStats};
pub use rate_limit::TraderRateLimiter;
pub use replay::{ReplayDriver, ReplayStats};
