//! Books repository

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::AppResult,
    models::book::{Book, BookMetadata},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    /// Books of a section
    pub async fn list_by_section(&self, section_id: i64) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE section_id = ? ORDER BY id")
            .bind(section_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Insert a book whose file is already written at `file_path`
    pub async fn create(&self, section_id: i64, metadata: &BookMetadata, file_path: &str) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (name, content, author, date_issued, section_id, file_path)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&metadata.book_name)
        .bind(&metadata.content)
        .bind(&metadata.author)
        .bind(Utc::now())
        .bind(section_id)
        .bind(file_path)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Delete a book; request and issued rows cascade
    pub async fn delete(&self, id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
