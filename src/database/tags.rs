/// Tag queries
use rusqlite::params;

use super::channels::{db_error, is_unique_violation};
use super::models::{TagCreateRequest, TagResponse};
use super::{parse_id_list, Database};
use crate::errors::{AppError, AppResult};

impl Database {
    /// All tags with their associated channel ids.
    pub fn list_tags(&self) -> AppResult<Vec<TagResponse>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT t.id, t.name, GROUP_CONCAT(ct.channel_id)
                 FROM tags AS t
                 LEFT JOIN channel_tag AS ct ON t.id = ct.tag_id
                 GROUP BY t.id
                 ORDER BY t.id",
            )
            .map_err(|e| db_error("failed to query tags", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(TagResponse {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    channels: parse_id_list(row.get(2)?),
                })
            })
            .map_err(|e| db_error("failed to query tags", e))?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row.map_err(|e| db_error("failed to read tag row", e))?);
        }
        Ok(tags)
    }

    /// Insert a tag and its channel links in one transaction.
    pub fn create_tag(&self, req: &TagCreateRequest) -> AppResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| db_error("failed to start transaction", e))?;

        if let Err(e) = tx.execute("INSERT INTO tags (name) VALUES (?1)", params![req.name]) {
            if is_unique_violation(&e) {
                return Err(AppError::Conflict("tag name already exists".to_string()));
            }
            return Err(db_error("failed to insert tag", e));
        }
        let tag_id = tx.last_insert_rowid();

        for channel_id in &req.channels {
            tx.execute(
                "INSERT INTO channel_tag (channel_id, tag_id) VALUES (?1, ?2)",
                params![channel_id, tag_id],
            )
            .map_err(|e| db_error("failed to insert channel tag link", e))?;
        }

        tx.commit().map_err(|e| db_error("failed to commit tag", e))
    }

    /// Delete a tag and its channel links.
    pub fn delete_tag(&self, id: i64) -> AppResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| db_error("failed to start transaction", e))?;

        tx.execute("DELETE FROM tags WHERE id = ?1", params![id])
            .map_err(|e| db_error("failed to delete tag", e))?;
        tx.execute("DELETE FROM channel_tag WHERE tag_id = ?1", params![id])
            .map_err(|e| db_error("failed to delete tag links", e))?;

        tx.commit().map_err(|e| db_error("failed to commit tag delete", e))
    }
}
