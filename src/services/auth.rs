//! Authentication and account registration service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{Credentials, Role, SessionClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Check librarian credentials and return a signed session token
    pub async fn login_librarian(&self, credentials: &Credentials) -> AppResult<Option<String>> {
        let Some(librarian) = self.repository.users.get_librarian(&credentials.username).await? else {
            return Ok(None);
        };
        if !verify_password(&librarian.password, &credentials.password)? {
            return Ok(None);
        }
        tracing::info!(librarian = %librarian.id, "Librarian logged in");
        self.issue_session(&librarian.id, Role::Librarian).map(Some)
    }

    /// Check user credentials and return a signed session token
    pub async fn login_user(&self, credentials: &Credentials) -> AppResult<Option<String>> {
        let Some(user) = self.repository.users.get_user(&credentials.username).await? else {
            return Ok(None);
        };
        if !verify_password(&user.password, &credentials.password)? {
            return Ok(None);
        }
        tracing::info!(user = %user.username, "User logged in");
        self.issue_session(&user.username, Role::User).map(Some)
    }

    /// Register a librarian.
    ///
    /// Only a signed-in librarian may add another one, except while no
    /// librarian exists at all.
    pub async fn register_librarian(&self, credentials: &Credentials, caller: Option<&SessionClaims>) -> AppResult<()> {
        let is_librarian = caller.map(|c| c.role == Role::Librarian).unwrap_or(false);
        if !is_librarian && self.repository.users.count_librarians().await? > 0 {
            return Err(AppError::LoginRequired(Role::Librarian));
        }
        let hash = hash_password(&credentials.password)?;
        self.repository.users.create_librarian(&credentials.username, &hash).await?;
        tracing::info!(librarian = %credentials.username, "Librarian registered");
        Ok(())
    }

    /// Register a reader account
    pub async fn register_user(&self, credentials: &Credentials) -> AppResult<()> {
        let hash = hash_password(&credentials.password)?;
        self.repository.users.create_user(&credentials.username, &hash).await?;
        tracing::info!(user = %credentials.username, "User registered");
        Ok(())
    }

    /// Decode a session cookie value; invalid or expired tokens yield `None`
    pub fn decode_session(&self, token: &str) -> Option<SessionClaims> {
        match SessionClaims::from_token(token, &self.config.session_secret) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Rejected session cookie: {}", e);
                None
            }
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    fn issue_session(&self, sub: &str, role: Role) -> AppResult<String> {
        SessionClaims::new(sub, role, self.config.session_hours)
            .create_token(&self.config.session_secret)
            .map_err(|e| AppError::Internal(format!("Failed to sign session: {}", e)))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 PHC string
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
