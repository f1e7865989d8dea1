//! Librarian and user accounts

use sqlx::{Pool, Sqlite};

use super::is_unique_violation;
use crate::{
    error::{AppError, AppResult},
    models::user::{Librarian, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get librarian by id
    pub async fn get_librarian(&self, id: &str) -> AppResult<Option<Librarian>> {
        let librarian = sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(librarian)
    }

    pub async fn count_librarians(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM librarians")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a librarian; `password_hash` must already be hashed
    pub async fn create_librarian(&self, id: &str, password_hash: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO librarians (id, password) VALUES (?, ?)")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Librarian already exists".to_string())
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    /// Get user by username
    pub async fn get_user(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Insert a user; `password_hash` must already be hashed
    pub async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Username already taken".to_string())
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }
}
