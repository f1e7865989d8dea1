//! Book model and upload metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::section::Section;

/// Book row; `file_path` lives inside the section's directory
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub author: String,
    pub date_issued: DateTime<Utc>,
    pub section_id: i64,
    #[serde(skip_serializing)]
    pub file_path: String,
}

/// Text fields sent alongside the PDF in the upload form
#[derive(Debug, Default, Validate)]
pub struct BookMetadata {
    #[validate(length(min = 1, max = 256))]
    pub book_name: String,
    pub content: String,
    #[validate(length(max = 256))]
    pub author: String,
}

/// PDF part of the upload form
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Multipart upload form (documentation only)
#[derive(ToSchema)]
pub struct UploadBookForm {
    pub book_name: String,
    pub content: String,
    pub author: String,
    /// PDF file
    #[schema(value_type = String, format = Binary)]
    pub pdf_file: Vec<u8>,
}

/// Books of one section
#[derive(Debug, Serialize, ToSchema)]
pub struct SectionBooks {
    pub section: Section,
    pub books: Vec<Book>,
}
