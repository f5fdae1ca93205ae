//! Configuration repository implementation
//!
//! PostgreSQL adapter for the typed key/value store. The receipt counter is
//! advanced with a single atomic upsert so concurrent callers can never
//! draw the same number, and a missing counter row starts the sequence at 1.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::PortError;
use domain_dues::{ConfigEntry, ConfigStore, ConfigValueType};
use sqlx::PgPool;

use crate::error::{map_sqlx, DatabaseError};

const SELECT_ENTRY: &str =
    "SELECT key, value, value_type, description, updated_at FROM club_config";

/// Raw club_config row
#[derive(Debug, sqlx::FromRow)]
struct ConfigRow {
    key: String,
    value: String,
    value_type: String,
    description: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConfigRow> for ConfigEntry {
    type Error = DatabaseError;

    fn try_from(row: ConfigRow) -> Result<Self, Self::Error> {
        let value_type: ConfigValueType = row
            .value_type
            .parse()
            .map_err(|_| DatabaseError::corrupt("value_type", &row.value_type))?;
        Ok(ConfigEntry {
            key: row.key,
            value: row.value,
            value_type,
            description: row.description,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for club configuration entries
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: PgPool,
}

impl ConfigRepository {
    /// Creates a new ConfigRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for ConfigRepository {
    async fn get(&self, key: &str) -> Result<Option<ConfigEntry>, PortError> {
        let row: Option<ConfigRow> =
            sqlx::query_as(&format!("{SELECT_ENTRY} WHERE key = $1"))
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        row.map(|row| ConfigEntry::try_from(row).map_err(PortError::from))
            .transpose()
    }

    async fn insert(&self, entry: &ConfigEntry) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO club_config (key, value, value_type, description, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(entry.value_type.as_str())
        .bind(entry.description.as_deref())
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<ConfigEntry, PortError> {
        let row: Option<ConfigRow> = sqlx::query_as(
            "UPDATE club_config SET value = $1, updated_at = now() WHERE key = $2 \
             RETURNING key, value, value_type, description, updated_at",
        )
        .bind(value)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        let row = row.ok_or_else(|| PortError::not_found("ConfigEntry", key))?;
        Ok(ConfigEntry::try_from(row).map_err(PortError::from)?)
    }

    async fn list(&self) -> Result<Vec<ConfigEntry>, PortError> {
        let rows: Vec<ConfigRow> =
            sqlx::query_as(&format!("{SELECT_ENTRY} ORDER BY key"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;
        rows.into_iter()
            .map(|row| ConfigEntry::try_from(row).map_err(PortError::from))
            .collect()
    }

    async fn delete(&self, key: &str) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM club_config WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("ConfigEntry", key));
        }
        Ok(())
    }

    async fn increment_counter(&self, key: &str) -> Result<i64, PortError> {
        let next: i64 = sqlx::query_scalar(
            "INSERT INTO club_config (key, value, value_type, updated_at) \
             VALUES ($1, '1', 'number', now()) \
             ON CONFLICT (key) DO UPDATE \
             SET value = ((club_config.value)::bigint + 1)::text, updated_at = now() \
             RETURNING (value)::bigint",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(next)
    }
}
