/// Channel queries
use rusqlite::params;

use super::models::{ChannelCreateRequest, ChannelResponse, ChannelUpdateRequest};
use super::{parse_id_list, Database};
use crate::errors::{AppError, AppResult};
use crate::logger::{self, LogTag};

impl Database {
    /// All channels with their associated tag ids.
    pub fn get_all_channels(&self) -> AppResult<Vec<ChannelResponse>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT c.id, c.name, c.default_title, GROUP_CONCAT(ct.tag_id)
                 FROM channels AS c
                 LEFT JOIN channel_tag AS ct ON c.id = ct.channel_id
                 GROUP BY c.id
                 ORDER BY c.id",
            )
            .map_err(|e| db_error("failed to query channels", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ChannelResponse {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    default_title: row.get(2)?,
                    tags: parse_id_list(row.get(3)?),
                })
            })
            .map_err(|e| db_error("failed to query channels", e))?;

        let mut channels = Vec::new();
        for row in rows {
            channels.push(row.map_err(|e| db_error("failed to read channel row", e))?);
        }
        Ok(channels)
    }

    /// Insert a channel and its tag links in one transaction.
    pub fn create_channel(&self, req: &ChannelCreateRequest) -> AppResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| db_error("failed to start transaction", e))?;

        if let Err(e) = tx.execute(
            "INSERT INTO channels (name, default_title) VALUES (?1, ?2)",
            params![req.name, req.default_title],
        ) {
            if is_unique_violation(&e) {
                return Err(AppError::Conflict("channel name already exists".to_string()));
            }
            return Err(db_error("failed to insert channel", e));
        }
        let channel_id = tx.last_insert_rowid();

        for tag_id in &req.tags {
            tx.execute(
                "INSERT INTO channel_tag (channel_id, tag_id) VALUES (?1, ?2)",
                params![channel_id, tag_id],
            )
            .map_err(|e| db_error("failed to insert channel tag link", e))?;
        }

        tx.commit().map_err(|e| db_error("failed to commit channel", e))
    }

    /// Update a channel and replace its tag links in one transaction.
    pub fn update_channel(&self, req: &ChannelUpdateRequest) -> AppResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| db_error("failed to start transaction", e))?;

        if let Err(e) = tx.execute(
            "UPDATE channels SET name = ?1, default_title = ?2 WHERE id = ?3",
            params![req.name, req.default_title, req.id],
        ) {
            if is_unique_violation(&e) {
                return Err(AppError::Conflict("channel name already exists".to_string()));
            }
            return Err(db_error("failed to update channel", e));
        }

        tx.execute("DELETE FROM channel_tag WHERE channel_id = ?1", params![req.id])
            .map_err(|e| db_error("failed to clear channel tag links", e))?;
        for tag_id in &req.tags {
            tx.execute(
                "INSERT INTO channel_tag (channel_id, tag_id) VALUES (?1, ?2)",
                params![req.id, tag_id],
            )
            .map_err(|e| db_error("failed to insert channel tag link", e))?;
        }

        tx.commit().map_err(|e| db_error("failed to commit channel update", e))
    }

    /// Delete a channel and its tag links.
    pub fn delete_channel(&self, id: i64) -> AppResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| db_error("failed to start transaction", e))?;

        tx.execute("DELETE FROM channels WHERE id = ?1", params![id])
            .map_err(|e| db_error("failed to delete channel", e))?;
        tx.execute("DELETE FROM channel_tag WHERE channel_id = ?1", params![id])
            .map_err(|e| db_error("failed to delete channel tag links", e))?;

        tx.commit().map_err(|e| db_error("failed to commit channel delete", e))
    }
}

/// Log the raw error, return a sanitized one.
pub(crate) fn db_error(context: &str, err: rusqlite::Error) -> AppError {
    logger::error(LogTag::Database, &format!("{}: {}", context, err));
    AppError::Database(context.to_string())
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
