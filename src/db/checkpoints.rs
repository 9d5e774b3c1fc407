//! Checkpoint persistence.

use async_trait::async_trait;

use crate::checkpoint::{CheckpointKey, CheckpointStore};
use crate::error::DatabaseError;
use crate::{Error, Result};

use super::{CheckpointRow, Database};

impl Database {
    /// Get the checkpoint row for a session/channel pair
    pub async fn get_checkpoint(
        &self,
        session_id: &str,
        channel_id: i64,
    ) -> Result<Option<CheckpointRow>> {
        sqlx::query_as::<_, CheckpointRow>(
            r#"
            SELECT session_id, channel_id, message_id, updated_at
            FROM checkpoints
            WHERE session_id = ? AND channel_id = ?
            "#,
        )
        .bind(session_id)
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get checkpoint: {}",
                e
            )))
        })
    }

    /// Insert or replace the checkpoint for a session/channel pair
    pub async fn upsert_checkpoint(
        &self,
        session_id: &str,
        channel_id: i64,
        message_id: i64,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO checkpoints (session_id, channel_id, message_id, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(session_id, channel_id)
            DO UPDATE SET message_id = excluded.message_id, updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(channel_id)
        .bind(message_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to save checkpoint: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// All checkpoints of a session, ordered by channel
    pub async fn list_checkpoints(&self, session_id: &str) -> Result<Vec<CheckpointRow>> {
        sqlx::query_as::<_, CheckpointRow>(
            r#"
            SELECT session_id, channel_id, message_id, updated_at
            FROM checkpoints
            WHERE session_id = ?
            ORDER BY channel_id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list checkpoints: {}",
                e
            )))
        })
    }
}

#[async_trait]
impl CheckpointStore for Database {
    async fn load(&self, key: &CheckpointKey) -> Result<Option<i64>> {
        Ok(self
            .get_checkpoint(&key.session_id, key.channel_id)
            .await?
            .map(|row| row.message_id))
    }

    async fn save(&self, key: &CheckpointKey, message_id: i64) -> Result<()> {
        self.upsert_checkpoint(&key.session_id, key.channel_id, message_id)
            .await
    }
}
