//! Simulation session repository.

use anyhow::Result;
use chrono::{DateTime, Utc};
use curvecopy_core::SimulationSession;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SessionRecord;

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Writes the session row at startup.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, session: &SimulationSession) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO simulation_sessions
                (id, started_at, ended_at, mode, config_json, initial_sol_balance,
                 final_sol_balance)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(session.id)
        .bind(session.started_at)
        .bind(session.ended_at)
        .bind(session.mode.as_str())
        .bind(&session.config_json)
        .bind(session.initial_sol_balance)
        .bind(session.final_sol_balance)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Closes the session at shutdown.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn close(
        &self,
        id: Uuid,
        ended_at: DateTime<Utc>,
        final_sol_balance: Decimal,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE simulation_sessions
            SET ended_at = $2, final_sol_balance = $3
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(ended_at)
        .bind(final_sol_balance)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a session by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<SessionRecord>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r"
            SELECT id, started_at, ended_at, mode, config_json, initial_sol_balance,
                   final_sol_balance
            FROM simulation_sessions
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
