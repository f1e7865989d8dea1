//! Accounts, roles and session claims

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Role carried by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Librarian,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Librarian => "librarian",
            Role::User => "user",
        }
    }

    /// Where a visitor lacking this role is sent
    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Librarian => "/librarian/login",
            Role::User => "/user/login",
        }
    }

    /// Landing page after a successful login
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Librarian => "/librarian/dashboard",
            Role::User => "/user/dashboard",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Librarian account row
#[derive(Debug, Clone, FromRow)]
pub struct Librarian {
    pub id: String,
    /// Argon2 PHC string
    pub password: String,
}

/// Reader account row
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    /// Argon2 PHC string
    pub password: String,
}

/// Login / registration form, shared by both roles
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct Credentials {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

/// Session payload stored in the signed cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Librarian id or username
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(sub: impl Into<String>, role: Role, lifetime_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: sub.into(),
            role,
            exp: now + (lifetime_hours as i64 * 3600),
            iat: now,
        }
    }

    /// Sign the claims into a cookie value
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Verify and decode a cookie value
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}
