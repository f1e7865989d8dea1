//! Borrow requests and issued books

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Workflow state of a (user, book) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    /// No request row
    None,
    Pending,
    Approved,
}

impl RequestState {
    /// Decode the (is_request, is_processed) flags of a stored row
    pub fn from_flags(is_request: bool, is_processed: bool) -> Option<Self> {
        match (is_request, is_processed) {
            (true, false) => Some(RequestState::Pending),
            (false, true) => Some(RequestState::Approved),
            _ => None,
        }
    }

    /// Flags written for a stored state; `None` has no row
    pub fn flags(&self) -> Option<(bool, bool)> {
        match self {
            RequestState::None => None,
            RequestState::Pending => Some((true, false)),
            RequestState::Approved => Some((false, true)),
        }
    }
}

/// Request row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRequest {
    pub user_id: String,
    pub book_id: i64,
    pub date: DateTime<Utc>,
    pub is_request: bool,
    pub is_processed: bool,
}

impl UserRequest {
    pub fn state(&self) -> RequestState {
        RequestState::from_flags(self.is_request, self.is_processed).unwrap_or(RequestState::None)
    }
}

/// Issued book row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserBook {
    pub user_id: String,
    pub book_id: i64,
    pub date_issued: DateTime<Utc>,
}

/// Request joined with book name, for the librarian listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RequestDetails {
    pub book_name: String,
    pub requested_by: String,
    pub book_id: i64,
    pub user_id: String,
}

/// Librarian decision on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Accept,
    Reject,
    Revoke,
}

/// Process request form
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequestForm {
    pub action: RequestAction,
    pub book_id: i64,
    pub user_id: String,
}

/// Pending and approved requests
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestQueue {
    pub requests: Vec<RequestDetails>,
    pub approved_requests: Vec<RequestDetails>,
}

/// Book reference in a user's shelf
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookRef {
    pub book_id: i64,
    pub book_name: String,
}

/// Books issued to a user
#[derive(Debug, Serialize, ToSchema)]
pub struct MyBooks {
    pub user_books: Vec<BookRef>,
    pub librarian_approved_requests: Vec<BookRef>,
}
