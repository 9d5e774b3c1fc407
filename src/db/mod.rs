//! Database layer for channel-dl
//!
//! Optional SQLite persistence for checkpoints, used when
//! `persistence.checkpoint_backend = "sqlite"`.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`checkpoints`] - Checkpoint reads and upserts

use sqlx::{FromRow, sqlite::SqlitePool};

mod checkpoints;
mod migrations;

/// Checkpoint row
#[derive(Debug, Clone, FromRow)]
pub struct CheckpointRow {
    /// Owning session
    pub session_id: String,
    /// Canonical channel id
    pub channel_id: i64,
    /// Last saved message id
    pub message_id: i64,
    /// Unix timestamp of the last update
    pub updated_at: i64,
}

/// Database handle for channel-dl
pub struct Database {
    pool: SqlitePool,
}
