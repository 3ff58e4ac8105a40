use std::collections::HashMap;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub wallets: WalletTrackingConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    pub url: String,
    pub reconnect_base_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
    pub reconnect_jitter_factor: f64,
    pub receive_buffer_size: usize,
    pub dedup_buffer_size: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: "wss://pumpportal.fun/api/data".to_string(),
            reconnect_base_delay_ms: 1000,
            reconnect_max_delay_ms: 30000,
            reconnect_jitter_factor: 0.2,
            receive_buffer_size: 10000,
            dedup_buffer_size: 10000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_sol_balance: Decimal,
    pub position_size_sol: Decimal,
    pub execution_delay_ms: u64,
    pub base_slippage_bps: Decimal,
    pub price_impact_factor: Decimal,
    pub max_slippage_bps: Decimal,
    pub max_trades_per_wallet_per_minute: usize,
    pub snapshot_interval_seconds: u64,
    pub skip_migrated_tokens: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_sol_balance: dec!(10),
            position_size_sol: dec!(0.1),
            execution_delay_ms: 400,
            base_slippage_bps: dec!(100),
            price_impact_factor: dec!(1),
            max_slippage_bps: dec!(1000),
            max_trades_per_wallet_per_minute: 10,
            snapshot_interval_seconds: 60,
            skip_migrated_tokens: true,
        }
    }
}

/// Tracked wallets. Membership in `tracked` is what subscribes a wallet;
/// the value is a display alias used in logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletTrackingConfig {
    #[serde(default)]
    pub tracked: HashMap<String, String>,
}

impl WalletTrackingConfig {
    #[must_use]
    pub fn wallet_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.tracked.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Resolves a wallet to its display alias, falling back to the raw key.
    #[must_use]
    pub fn alias<'a>(&'a self, wallet: &'a str) -> &'a str {
        self.tracked.get(wallet).map_or(wallet, String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub enabled: bool,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub filter_wallets: Vec<String>,
    pub batch_size: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            from: None,
            to: None,
            filter_wallets: Vec::new(),
            batch_size: 500,
        }
    }
}

impl AppConfig {
    /// Validates every option against its documented range. Called once at
    /// startup; any violation is fatal.
    ///
    /// # Errors
    /// Returns a descriptive error naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        check_range(
            "simulation.initial_sol_balance",
            sim.initial_sol_balance,
            dec!(0.01),
            dec!(10000),
        )?;
        check_range(
            "simulation.position_size_sol",
            sim.position_size_sol,
            dec!(0.001),
            dec!(1000),
        )?;
        if sim.execution_delay_ms > 30000 {
            bail!("simulation.execution_delay_ms must be at most 30000");
        }
        check_range(
            "simulation.base_slippage_bps",
            sim.base_slippage_bps,
            Decimal::ZERO,
            dec!(5000),
        )?;
        check_range(
            "simulation.price_impact_factor",
            sim.price_impact_factor,
            Decimal::ZERO,
            dec!(100),
        )?;
        check_range(
            "simulation.max_slippage_bps",
            sim.max_slippage_bps,
            Decimal::ZERO,
            dec!(10000),
        )?;
        if !(1..=1000).contains(&sim.max_trades_per_wallet_per_minute) {
            bail!("simulation.max_trades_per_wallet_per_minute must be between 1 and 1000");
        }
        if !(10..=3600).contains(&sim.snapshot_interval_seconds) {
            bail!("simulation.snapshot_interval_seconds must be between 10 and 3600");
        }

        let ws = &self.websocket;
        if !(0.0..=1.0).contains(&ws.reconnect_jitter_factor) {
            bail!("websocket.reconnect_jitter_factor must be between 0.0 and 1.0");
        }
        if ws.receive_buffer_size == 0 {
            bail!("websocket.receive_buffer_size must be positive");
        }
        if ws.dedup_buffer_size == 0 {
            bail!("websocket.dedup_buffer_size must be positive");
        }

        if self.replay.enabled {
            let (Some(from), Some(to)) = (self.replay.from, self.replay.to) else {
                bail!("replay.from and replay.to are required when replay is enabled");
            };
            if from > to {
                bail!("replay.from must not be after replay.to");
            }
            if self.replay.batch_size == 0 {
                bail!("replay.batch_size must be positive");
            }
        }

        Ok(())
    }
}

fn check_range(name: &str, value: Decimal, min: Decimal, max: Decimal) -> Result<()> {
    if value < min || value > max {
        bail!("{name} must be between {min} and {max}, got {value}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            database: DatabaseConfig {
                url: "postgresql://localhost/curvecopy".to_string(),
                max_connections: 10,
            },
            websocket: WebSocketConfig::default(),
            simulation: SimulationConfig::default(),
            wallets: WalletTrackingConfig::default(),
            replay: ReplayConfig::default(),
        }
    }

    #[test]
    fn defaults_validate() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn position_size_out_of_range_is_rejected() {
        let mut config = valid_config();
        config.simulation.position_size_sol = dec!(5000);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("position_size_sol"), "got: {err}");
    }

    #[test]
    fn jitter_factor_above_one_is_rejected() {
        let mut config = valid_config();
        config.websocket.reconnect_jitter_factor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn enabled_replay_requires_endpoints() {
        let mut config = valid_config();
        config.replay.enabled = true;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("replay.from"), "got: {err}");
    }

    #[test]
    fn replay_range_must_be_ordered() {
        let mut config = valid_config();
        config.replay.enabled = true;
        config.replay.from = Some("2025-06-02T00:00:00Z".parse().unwrap());
        config.replay.to = Some("2025-06-01T00:00:00Z".parse().unwrap());
        assert!(config.validate().is_err());
    }

    #[test]
    fn alias_falls_back_to_raw_key() {
        let mut config = valid_config();
        config
            .wallets
            .tracked
            .insert("wallet-abc".to_string(), "whale-7".to_string());

        assert_eq!(config.wallets.alias("wallet-abc"), "whale-7");
        assert_eq!(config.wallets.alias("wallet-xyz"), "wallet-xyz");
    }

    #[test]
    fn wallet_keys_are_sorted_for_stable_subscriptions() {
        let mut config = valid_config();
        config
            .wallets
            .tracked
            .insert("bbb".to_string(), "b".to_string());
        config
            .wallets
            .tracked
            .insert("aaa".to_string(), "a".to_string());

        assert_eq!(config.wallets.wallet_keys(), vec!["aaa", "bbb"]);
    }
}
