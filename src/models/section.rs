//! Section model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A named collection of books backed by one directory
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub date_created: DateTime<Utc>,
    pub description: String,
    #[serde(skip_serializing)]
    pub directory_path: String,
}

/// Create section form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSection {
    #[validate(length(min = 1, max = 128))]
    pub section_name: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub description: String,
}
