//! Borrow requests and issued books

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::AppResult,
    models::request::{BookRef, RequestDetails, RequestState, UserBook, UserRequest},
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Sqlite>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get the request row of a (user, book) pair
    pub async fn get(&self, user_id: &str, book_id: i64) -> AppResult<Option<UserRequest>> {
        let row = sqlx::query_as::<_, UserRequest>(
            "SELECT * FROM user_requests WHERE user_id = ? AND book_id = ?",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a pending request; an existing row is left untouched.
    /// Returns true when a row was inserted.
    pub async fn create_pending(&self, user_id: &str, book_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_requests (user_id, book_id, date, is_request, is_processed)
            VALUES (?, ?, ?, 1, 0)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a pending request to approved and issue the book.
    /// Returns false when no pending row existed; nothing is written then.
    pub async fn approve(&self, user_id: &str, book_id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE user_requests SET is_request = 0, is_processed = 1
            WHERE user_id = ? AND book_id = ? AND is_request = 1 AND is_processed = 0
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO user_books (user_id, book_id, date_issued)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete the request and any issued-book row of a (user, book) pair
    pub async fn remove(&self, user_id: &str, book_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_requests WHERE user_id = ? AND book_id = ?")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_books WHERE user_id = ? AND book_id = ?")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Requests in the given state joined with their book
    pub async fn list_by_state(&self, state: RequestState) -> AppResult<Vec<RequestDetails>> {
        let Some((is_request, is_processed)) = state.flags() else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, RequestDetails>(
            r#"
            SELECT b.name AS book_name, u.username AS requested_by,
                   r.book_id AS book_id, r.user_id AS user_id
            FROM user_requests r
            INNER JOIN books b ON r.book_id = b.id
            INNER JOIN users u ON r.user_id = u.username
            WHERE r.is_request = ? AND r.is_processed = ?
            ORDER BY r.date
            "#,
        )
        .bind(is_request)
        .bind(is_processed)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Books issued to a user
    pub async fn issued_books(&self, user_id: &str) -> AppResult<Vec<BookRef>> {
        let rows = sqlx::query_as::<_, BookRef>(
            r#"
            SELECT b.id AS book_id, b.name AS book_name
            FROM user_books ub
            INNER JOIN books b ON ub.book_id = b.id
            WHERE ub.user_id = ?
            ORDER BY ub.date_issued
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Approved requests of a user
    pub async fn approved_for_user(&self, user_id: &str) -> AppResult<Vec<BookRef>> {
        let rows = sqlx::query_as::<_, BookRef>(
            r#"
            SELECT b.id AS book_id, b.name AS book_name
            FROM user_requests r
            INNER JOIN books b ON r.book_id = b.id
            WHERE r.is_request = 0 AND r.is_processed = 1 AND r.user_id = ?
            ORDER BY r.date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Issued-book row of a (user, book) pair
    pub async fn get_issued(&self, user_id: &str, book_id: i64) -> AppResult<Option<UserBook>> {
        let row = sqlx::query_as::<_, UserBook>(
            "SELECT * FROM user_books WHERE user_id = ? AND book_id = ?",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
