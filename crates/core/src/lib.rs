pub mod config;
pub mod config_loader;
pub mod events;
pub mod execution;
pub mod metrics;
pub mod portfolio;
pub mod pricing;
pub mod session;
pub mod slippage;
pub mod summary;
pub mod traits;

pub use config::{
    AppConfig, DatabaseConfig, ReplayConfig, SimulationConfig, WalletTrackingConfig,
    WebSocketConfig,
};
pub use config_loader::ConfigLoader;
pub use events::{
    EventSource, IntentKind, SimulatedTrade, TradeEvent, TradeExecutionResult, TradeIntent,
    TradeSide, CURVE_POOL,
};
pub use execution::SimulatedExecutor;
pub use metrics::{MetricsTracker, PerformanceSnapshot};
pub use portfolio::{Position, VirtualWallet};
pub use pricing::PriceError;
pub use session::{SimulationMode, SimulationSession};
pub use slippage::SlippageModel;
pub use summary::SessionSummary;
pub use traits::TradeExecutor;
