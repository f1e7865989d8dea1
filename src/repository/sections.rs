//! Sections repository

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{error::AppResult, models::section::Section};

#[derive(Clone)]
pub struct SectionsRepository {
    pool: Pool<Sqlite>,
}

impl SectionsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all sections
    pub async fn list(&self) -> AppResult<Vec<Section>> {
        let rows = sqlx::query_as::<_, Section>("SELECT * FROM sections ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get section by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Section>> {
        let section = sqlx::query_as::<_, Section>("SELECT * FROM sections WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(section)
    }

    /// Insert a section whose directory already exists.
    ///
    /// The insert runs to completion before the row is read back, so the new
    /// section is visible on every pool connection once this returns.
    pub async fn create(&self, name: &str, description: &str, directory_path: &str) -> AppResult<Section> {
        let result = sqlx::query(
            r#"
            INSERT INTO sections (name, date_created, description, directory_path)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .bind(description)
        .bind(directory_path)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, Section>("SELECT * FROM sections WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Delete a section; books and their requests cascade.
    /// Returns the number of deleted rows.
    pub async fn delete(&self, id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sections WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
