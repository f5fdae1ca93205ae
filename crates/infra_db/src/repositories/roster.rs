//! Roster repository implementation
//!
//! Read-only PostgreSQL adapter for the player directory. Every query joins
//! the owning category so callers always see the current monthly fee.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_kernel::{CategoryId, Currency, Money, PlayerId, PortError};
use domain_roster::{ActivePlayer, Category, Player, PlayerDirectory};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{map_sqlx, DatabaseError};

const SELECT_PLAYER: &str = "SELECT p.id, p.first_name, p.last_name, p.document, \
     p.birth_date, p.phone, p.email, p.is_active, \
     c.id AS category_id, c.name AS category_name, c.monthly_fee, c.currency, \
     c.min_age, c.max_age, c.description AS category_description, \
     c.is_active AS category_is_active \
     FROM players p JOIN categories c ON c.id = p.category_id";

/// Joined players/categories row
#[derive(Debug, sqlx::FromRow)]
struct PlayerRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    document: String,
    birth_date: NaiveDate,
    phone: Option<String>,
    email: Option<String>,
    is_active: bool,
    category_id: Uuid,
    category_name: String,
    monthly_fee: Decimal,
    currency: String,
    min_age: Option<i16>,
    max_age: Option<i16>,
    category_description: Option<String>,
    category_is_active: bool,
}

impl TryFrom<PlayerRow> for Player {
    type Error = DatabaseError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        let currency: Currency = row
            .currency
            .trim()
            .parse()
            .map_err(|_| DatabaseError::corrupt("currency", &row.currency))?;
        let category = Category {
            id: CategoryId::from_uuid(row.category_id),
            name: row.category_name,
            monthly_fee: Money::new(row.monthly_fee, currency),
            min_age: row.min_age.map(|age| age as u8),
            max_age: row.max_age.map(|age| age as u8),
            description: row.category_description,
            is_active: row.category_is_active,
        };
        Ok(Player {
            id: PlayerId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            document: row.document,
            birth_date: row.birth_date,
            phone: row.phone,
            email: row.email,
            category,
            is_active: row.is_active,
        })
    }
}

/// Read-only repository over players and their categories
#[derive(Debug, Clone)]
pub struct PlayerRepository {
    pool: PgPool,
}

impl PlayerRepository {
    /// Creates a new PlayerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerDirectory for PlayerRepository {
    async fn list_active(&self) -> Result<Vec<ActivePlayer>, PortError> {
        let rows: Vec<PlayerRow> = sqlx::query_as(&format!(
            "{SELECT_PLAYER} WHERE p.is_active ORDER BY p.last_name, p.first_name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.into_iter()
            .map(|row| {
                Player::try_from(row)
                    .map(|player| ActivePlayer::from(&player))
                    .map_err(PortError::from)
            })
            .collect()
    }

    async fn find(&self, id: PlayerId) -> Result<Option<Player>, PortError> {
        let row: Option<PlayerRow> =
            sqlx::query_as(&format!("{SELECT_PLAYER} WHERE p.id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        row.map(|row| Player::try_from(row).map_err(PortError::from))
            .transpose()
    }

    async fn find_many(&self, ids: &[PlayerId]) -> Result<Vec<Player>, PortError> {
        let uuids: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();
        let rows: Vec<PlayerRow> =
            sqlx::query_as(&format!("{SELECT_PLAYER} WHERE p.id = ANY($1)"))
                .bind(&uuids)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;
        rows.into_iter()
            .map(|row| Player::try_from(row).map_err(PortError::from))
            .collect()
    }

    async fn count_all(&self) -> Result<u64, PortError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(count as u64)
    }

    async fn count_active(&self) -> Result<u64, PortError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players WHERE is_active")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(count as u64)
    }
}
