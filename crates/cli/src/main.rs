use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use curvecopy_core::{
    AppConfig, ConfigLoader, SimulatedExecutor, SimulationMode, SimulationSession, SlippageModel,
    TradeExecutor,
};
use curvecopy_data::{DatabaseClient, Repositories};
use curvecopy_engine::{
    IngestDriver, PgEventLog, PgSimulationStore, Processor, ReplayDriver, SimulationStore,
};
use curvecopy_feed::FeedClient;

#[derive(Parser)]
#[command(name = "curvecopy")]
#[command(about = "Deterministic copy-trading simulator for bonding-curve tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the live feed and simulate copies of every tracked trade
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Re-drive the simulation from the persisted event log
    Replay {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,tokio_tungstenite=warn,tungstenite=warn")
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run_live(&config).await,
        Commands::Replay { config } => run_replay(&config).await,
    }
}

async fn run_live(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    if config.wallets.tracked.is_empty() {
        bail!("no tracked wallets configured; nothing to copy");
    }
    tracing::info!(
        wallets = config.wallets.tracked.len(),
        "starting live simulation"
    );

    let (repos, shutdown, tx, rx) = bootstrap(&config).await?;
    spawn_signal_handler(shutdown.clone());

    let session = SimulationSession::begin(SimulationMode::Live, &config, Utc::now())?;
    let client = FeedClient::new(&config.websocket);
    let event_log = Arc::new(PgEventLog::new(repos.trade_events.clone()));
    let ingest = IngestDriver::new(&config, client, event_log, tx, shutdown.clone());
    let processor = build_processor(&config, session, rx, &repos, shutdown.clone());

    let ingest_handle = tokio::spawn(ingest.run());
    let processor_handle = tokio::spawn(processor.run());

    let (ingest_result, processor_result) = tokio::try_join!(ingest_handle, processor_handle)?;
    ingest_result?;
    processor_result?;

    tracing::info!("live simulation stopped");
    Ok(())
}

async fn run_replay(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    if !config.replay.enabled {
        bail!("replay is not enabled in the configuration");
    }

    let (repos, shutdown, tx, rx) = bootstrap(&config).await?;
    spawn_signal_handler(shutdown.clone());

    let session = SimulationSession::begin(SimulationMode::Replay, &config, Utc::now())?;
    let replay = ReplayDriver::new(
        repos.trade_events.clone(),
        config.replay.clone(),
        tx,
        shutdown.clone(),
    );
    let processor = build_processor(&config, session, rx, &repos, shutdown);

    let replay_handle = tokio::spawn(replay.run());
    let processor_handle = tokio::spawn(processor.run());

    let (replay_result, processor_result) = tokio::try_join!(replay_handle, processor_handle)?;
    replay_result?;
    processor_result?;

    tracing::info!("replay finished");
    Ok(())
}

type Bootstrap = (
    Repositories,
    CancellationToken,
    mpsc::Sender<curvecopy_core::TradeEvent>,
    mpsc::Receiver<curvecopy_core::TradeEvent>,
);

async fn bootstrap(config: &AppConfig) -> Result<Bootstrap> {
    let db = DatabaseClient::connect(&config.database.url, config.database.max_connections).await?;
    db.init_schema().await?;
    let repos = Repositories::new(db.pool());

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(config.websocket.receive_buffer_size);
    Ok((repos, shutdown, tx, rx))
}

fn build_processor(
    config: &AppConfig,
    session: SimulationSession,
    rx: mpsc::Receiver<curvecopy_core::TradeEvent>,
    repos: &Repositories,
    shutdown: CancellationToken,
) -> Processor {
    let executor: Arc<dyn TradeExecutor> = Arc::new(SimulatedExecutor::new(
        SlippageModel::from_config(&config.simulation),
    ));
    let store: Arc<dyn SimulationStore> = Arc::new(PgSimulationStore::new(
        repos.sessions.clone(),
        repos.simulated_trades.clone(),
        repos.snapshots.clone(),
    ));
    Processor::new(config, session, rx, executor, store, shutdown)
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received, draining pipeline");
            shutdown.cancel();
        }
    });
}
