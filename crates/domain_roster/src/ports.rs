//! Roster Domain Ports
//!
//! The `PlayerDirectory` trait is the read-only view of the roster the dues
//! core consumes: active players with their category fee for generation,
//! lookups for report decoration, and counts for the statistics dashboard.
//! Adapters: PostgreSQL (infra_db) and in-memory (test_utils).

use async_trait::async_trait;
use core_kernel::{PlayerId, PortError};

use crate::player::{ActivePlayer, Player};

/// Read-only access to the club roster
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Lists every active player with their category's fixed monthly fee
    async fn list_active(&self) -> Result<Vec<ActivePlayer>, PortError>;

    /// Finds a single player by id
    async fn find(&self, id: PlayerId) -> Result<Option<Player>, PortError>;

    /// Finds many players by id, skipping unknown ids
    async fn find_many(&self, ids: &[PlayerId]) -> Result<Vec<Player>, PortError>;

    /// Total number of players on the roster
    async fn count_all(&self) -> Result<u64, PortError>;

    /// Number of currently active players
    async fn count_active(&self) -> Result<u64, PortError>;
}
