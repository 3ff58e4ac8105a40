use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationMode {
    Live,
    Replay,
}

impl SimulationMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Replay => "replay",
        }
    }
}

/// One contiguous run of the simulator: the unit of reproducibility.
///
/// The effective configuration is frozen into `config_json` at startup so a
/// session row fully describes how its trades were produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub mode: SimulationMode,
    pub config_json: serde_json::Value,
    pub initial_sol_balance: Decimal,
    pub final_sol_balance: Option<Decimal>,
}

impl SimulationSession {
    /// Opens a new session with a fresh id and a serialized copy of the
    /// effective configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be serialized.
    pub fn begin(
        mode: SimulationMode,
        config: &AppConfig,
        started_at: DateTime<Utc>,
    ) -> Result<Self> {
        let config_json =
            serde_json::to_value(config).context("failed to serialize session config")?;
        Ok(Self {
            id: Uuid::new_v4(),
            started_at,
            ended_at: None,
            mode,
            config_json,
            initial_sol_balance: config.simulation.initial_sol_balance,
            final_sol_balance: None,
        })
    }

    /// Marks the session closed.
    pub fn close(&mut self, ended_at: DateTime<Utc>, final_sol_balance: Decimal) {
        self.ended_at = Some(ended_at);
        self.final_sol_balance = Some(final_sol_balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn config() -> AppConfig {
        AppConfig {
            database: DatabaseConfig {
                url: "postgresql://localhost/curvecopy".to_string(),
                max_connections: 5,
            },
            websocket: Default::default(),
            simulation: Default::default(),
            wallets: Default::default(),
            replay: Default::default(),
        }
    }

    #[test]
    fn begin_freezes_config_and_initial_balance() {
        let started = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let session = SimulationSession::begin(SimulationMode::Live, &config(), started).unwrap();

        assert_eq!(session.started_at, started);
        assert_eq!(session.initial_sol_balance, dec!(10));
        assert!(session.ended_at.is_none());
        assert_eq!(
            session.config_json["simulation"]["position_size_sol"],
            serde_json::json!("0.1")
        );
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let started = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let a = SimulationSession::begin(SimulationMode::Live, &config(), started).unwrap();
        let b = SimulationSession::begin(SimulationMode::Replay, &config(), started).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn close_stamps_end_state() {
        let started = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut session =
            SimulationSession::begin(SimulationMode::Replay, &config(), started).unwrap();

        let ended = started + chrono::Duration::hours(2);
        session.close(ended, dec!(11.5));

        assert_eq!(session.ended_at, Some(ended));
        assert_eq!(session.final_sol_balance, Some(dec!(11.5)));
        assert_eq!(session.mode.as_str(), "replay");
    }
}
