//! Registered time entries repository

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::now_iso8601;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeEntryRecord {
    pub id: String,
    pub date_registered: String,
    pub time_registered: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateTimeEntry {
    pub date_registered: String,
    pub time_registered: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct UpdateTimeEntry {
    pub time_registered: String,
}

#[derive(Debug, Clone, Default)]
pub struct TimeEntryFilter {
    pub user_id: Option<String>,
}

const ENTRY_COLUMNS: &str = "id, date_registered, time_registered, user_id, created_at, updated_at";

pub struct TimeEntriesRepository {
    pool: SqlitePool,
}

impl TimeEntriesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a time entry owned by `entry.user_id`
    pub async fn create(&self, entry: CreateTimeEntry) -> Result<TimeEntryRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO time_entries (id, date_registered, time_registered, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&entry.date_registered)
        .bind(&entry.time_registered)
        .bind(&entry.user_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create time entry"))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<TimeEntryRecord>> {
        let record = sqlx::query_as::<_, TimeEntryRecord>(&format!(
            "SELECT {} FROM time_entries WHERE id = ?",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// List entries in creation order, optionally restricted to one owner
    pub async fn list(&self, filter: TimeEntryFilter) -> Result<Vec<TimeEntryRecord>> {
        let records = match filter.user_id {
            Some(user_id) => {
                sqlx::query_as::<_, TimeEntryRecord>(&format!(
                    "SELECT {} FROM time_entries WHERE user_id = ? ORDER BY rowid",
                    ENTRY_COLUMNS
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TimeEntryRecord>(&format!(
                    "SELECT {} FROM time_entries ORDER BY rowid",
                    ENTRY_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(records)
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<TimeEntryRecord>> {
        self.list(TimeEntryFilter {
            user_id: Some(user_id.to_string()),
        })
        .await
    }

    /// Returns `None` if the entry does not exist
    pub async fn update(&self, id: &str, update: UpdateTimeEntry) -> Result<Option<TimeEntryRecord>> {
        let result = sqlx::query(
            "UPDATE time_entries SET time_registered = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&update.time_registered)
        .bind(now_iso8601())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
