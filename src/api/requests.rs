//! Borrow request endpoints

use axum::{
    extract::{Path, State},
    response::Response,
    Form, Json,
};

use crate::{
    error::AppResult,
    models::{
        request::{MyBooks, ProcessRequestForm, RequestQueue},
        user::Role,
    },
    AppState,
};

use super::{found, LibrarianSession, UserSession};

const PROCESS_PAGE: &str = "/librarian/process_request";

/// Pending and approved requests
#[utoipa::path(
    get,
    path = "/librarian/process_request",
    tag = "requests",
    responses(
        (status = 200, description = "Request queue", body = RequestQueue),
        (status = 302, description = "Not signed in as librarian")
    )
)]
pub async fn request_queue(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
) -> AppResult<Json<RequestQueue>> {
    let queue = state.services.requests.queue().await?;
    Ok(Json(queue))
}

/// Accept, reject or revoke a request
#[utoipa::path(
    post,
    path = "/librarian/process_request",
    tag = "requests",
    request_body(content = ProcessRequestForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Processed, redirect to the request queue"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn process_request(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
    Form(form): Form<ProcessRequestForm>,
) -> AppResult<Response> {
    state
        .services
        .requests
        .process(form.action, &form.user_id, form.book_id)
        .await?;
    Ok(found(PROCESS_PAGE))
}

/// Revoke an issued book
#[utoipa::path(
    post,
    path = "/librarian/revoke_request/{book_id}/{username}",
    tag = "requests",
    params(
        ("book_id" = i64, Path, description = "Book ID"),
        ("username" = String, Path, description = "Borrower")
    ),
    responses(
        (status = 302, description = "Revoked, redirect to the request queue")
    )
)]
pub async fn revoke_request(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
    Path((book_id, username)): Path<(i64, String)>,
) -> AppResult<Response> {
    state.services.requests.revoke(&username, book_id).await?;
    Ok(found(PROCESS_PAGE))
}

/// Request a book for the signed-in user
#[utoipa::path(
    post,
    path = "/user/request_book/{book_id}",
    tag = "requests",
    params(("book_id" = i64, Path, description = "Book ID")),
    responses(
        (status = 302, description = "Requested, redirect to the user dashboard"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn request_book(
    State(state): State<AppState>,
    UserSession(claims): UserSession,
    Path(book_id): Path<i64>,
) -> AppResult<Response> {
    state.services.requests.request_book(&claims.sub, book_id).await?;
    Ok(found(Role::User.dashboard_path()))
}

/// Books issued to the signed-in user
#[utoipa::path(
    get,
    path = "/user/my_books",
    tag = "requests",
    responses(
        (status = 200, description = "Issued books and approved requests", body = MyBooks),
        (status = 302, description = "Not signed in as user")
    )
)]
pub async fn my_books(
    State(state): State<AppState>,
    UserSession(claims): UserSession,
) -> AppResult<Json<MyBooks>> {
    let books = state.services.requests.my_books(&claims.sub).await?;
    Ok(Json(books))
}
