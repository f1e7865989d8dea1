//! Borrow request workflow
//!
//! NONE → PENDING on user request; PENDING → APPROVED on accept (the book is
//! issued); PENDING or APPROVED → NONE on reject or revoke.

use crate::{
    error::{AppError, AppResult},
    models::request::{MyBooks, RequestAction, RequestQueue, RequestState},
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Current state of a (user, book) pair
    pub async fn state(&self, user_id: &str, book_id: i64) -> AppResult<RequestState> {
        Ok(self
            .repository
            .requests
            .get(user_id, book_id)
            .await?
            .map(|r| r.state())
            .unwrap_or(RequestState::None))
    }

    /// NONE → PENDING. An existing request is left as it is.
    pub async fn request_book(&self, user_id: &str, book_id: i64) -> AppResult<RequestState> {
        if self.repository.books.get_by_id(book_id).await?.is_none() {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        if self.repository.requests.create_pending(user_id, book_id).await? {
            tracing::info!(user = user_id, book_id, "Book requested");
            Ok(RequestState::Pending)
        } else {
            self.state(user_id, book_id).await
        }
    }

    /// PENDING → APPROVED and issue the book. Approved requests stay approved.
    pub async fn accept(&self, user_id: &str, book_id: i64) -> AppResult<()> {
        match self.state(user_id, book_id).await? {
            RequestState::None => Err(AppError::NotFound("Request not found".to_string())),
            RequestState::Approved => Ok(()),
            RequestState::Pending => {
                if self.repository.requests.approve(user_id, book_id).await? {
                    tracing::info!(user = user_id, book_id, "Request accepted");
                    Ok(())
                } else {
                    // Removed between the read and the update
                    Err(AppError::NotFound("Request not found".to_string()))
                }
            }
        }
    }

    /// Back to NONE: drop the request and any issued copy
    pub async fn reject(&self, user_id: &str, book_id: i64) -> AppResult<()> {
        self.repository.requests.remove(user_id, book_id).await?;
        tracing::info!(user = user_id, book_id, "Request rejected");
        Ok(())
    }

    /// Back to NONE from APPROVED: drop the request and the issued copy
    pub async fn revoke(&self, user_id: &str, book_id: i64) -> AppResult<()> {
        self.repository.requests.remove(user_id, book_id).await?;
        tracing::info!(user = user_id, book_id, "Book revoked");
        Ok(())
    }

    pub async fn process(&self, action: RequestAction, user_id: &str, book_id: i64) -> AppResult<()> {
        match action {
            RequestAction::Accept => self.accept(user_id, book_id).await,
            RequestAction::Reject => self.reject(user_id, book_id).await,
            RequestAction::Revoke => self.revoke(user_id, book_id).await,
        }
    }

    /// Pending and approved requests for the librarian
    pub async fn queue(&self) -> AppResult<RequestQueue> {
        Ok(RequestQueue {
            requests: self.repository.requests.list_by_state(RequestState::Pending).await?,
            approved_requests: self.repository.requests.list_by_state(RequestState::Approved).await?,
        })
    }

    pub async fn my_books(&self, user_id: &str) -> AppResult<MyBooks> {
        Ok(MyBooks {
            user_books: self.repository.requests.issued_books(user_id).await?,
            librarian_approved_requests: self.repository.requests.approved_for_user(user_id).await?,
        })
    }

    pub async fn is_issued(&self, user_id: &str, book_id: i64) -> AppResult<bool> {
        Ok(self.repository.requests.get_issued(user_id, book_id).await?.is_some())
    }
}
