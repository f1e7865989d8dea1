//! Book upload, listing, deletion and PDF delivery

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Multipart;
use tokio_util::io::ReaderStream;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookMetadata, SectionBooks, UploadBookForm, UploadedFile},
        user::{Role, SessionClaims},
    },
    services::catalog::BookFile,
    AppState,
};

use super::{found, CurrentSession, LibrarianSession};

/// Books of a section, as seen by a librarian
#[utoipa::path(
    get,
    path = "/section_books/{section_id}",
    tag = "books",
    params(("section_id" = i64, Path, description = "Section ID")),
    responses(
        (status = 200, description = "Section and its books", body = SectionBooks),
        (status = 302, description = "Not signed in as librarian"),
        (status = 404, description = "Section not found")
    )
)]
pub async fn section_books(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
    Path(section_id): Path<i64>,
) -> AppResult<Json<SectionBooks>> {
    let books = state.services.catalog.section_books(section_id).await?;
    Ok(Json(books))
}

/// Upload a PDF into a section
#[utoipa::path(
    post,
    path = "/section_books/{section_id}",
    tag = "books",
    params(("section_id" = i64, Path, description = "Section ID")),
    request_body(content = UploadBookForm, content_type = "multipart/form-data"),
    responses(
        (status = 302, description = "Redirect to the section; non-PDF uploads are dropped"),
        (status = 404, description = "Section not found")
    )
)]
pub async fn upload_book(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
    Path(section_id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut metadata = BookMetadata::default();
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "book_name" => metadata.book_name = field.text().await?,
            "content" => metadata.content = field.text().await?,
            "author" => metadata.author = field.text().await?,
            "pdf_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?.to_vec();
                file = Some(UploadedFile { filename, data });
            }
            _ => {}
        }
    }

    metadata.validate()?;

    let redirect = found(&format!("/section_books/{}", section_id));
    match file {
        Some(file) if !file.filename.is_empty() => {
            state.services.catalog.upload_book(section_id, &metadata, &file).await?;
        }
        _ => {
            // Section must still exist for the redirect to make sense
            state.services.catalog.get_section(section_id).await?;
            tracing::warn!(section_id, "Upload without a file ignored");
        }
    }
    Ok(redirect)
}

/// Delete a book and its file
#[utoipa::path(
    post,
    path = "/delete_book/{book_id}",
    tag = "books",
    params(("book_id" = i64, Path, description = "Book ID")),
    responses(
        (status = 302, description = "Redirect to the book's section")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
    Path(book_id): Path<i64>,
) -> AppResult<Response> {
    let deleted = state.services.catalog.delete_book(book_id).await?;
    Ok(match deleted {
        Some(book) => found(&format!("/section_books/{}", book.section_id)),
        None => found(Role::Librarian.dashboard_path()),
    })
}

/// Download a book as an attachment
#[utoipa::path(
    get,
    path = "/section_books_download/{book_id}",
    tag = "books",
    params(("book_id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "PDF file", content_type = "application/pdf"),
        (status = 302, description = "Not signed in"),
        (status = 404, description = "Book not found / File not found")
    )
)]
pub async fn download_book(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(book_id): Path<i64>,
) -> AppResult<Response> {
    authorize_book(&state, session.as_ref(), book_id, Role::Librarian).await?;
    let file = state.services.catalog.book_file(book_id).await?;
    Ok(pdf_response(file, "attachment"))
}

/// Show a book inline
#[utoipa::path(
    get,
    path = "/section_books_view/{book_id}",
    tag = "books",
    params(("book_id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "PDF file", content_type = "application/pdf"),
        (status = 302, description = "Not signed in"),
        (status = 404, description = "Book not found / File not found")
    )
)]
pub async fn view_book(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(book_id): Path<i64>,
) -> AppResult<Response> {
    authorize_book(&state, session.as_ref(), book_id, Role::User).await?;
    let file = state.services.catalog.book_file(book_id).await?;
    Ok(pdf_response(file, "inline"))
}

/// Librarians read everything; users only books issued to them.
/// Anonymous callers go to the `login_as` login page.
async fn authorize_book(
    state: &AppState,
    session: Option<&SessionClaims>,
    book_id: i64,
    login_as: Role,
) -> AppResult<()> {
    match session {
        Some(claims) if claims.role == Role::Librarian => Ok(()),
        Some(claims) => {
            if state.services.requests.is_issued(&claims.sub, book_id).await? {
                Ok(())
            } else {
                Err(AppError::NotFound("Book not found".to_string()))
            }
        }
        None => Err(AppError::LoginRequired(login_as)),
    }
}

fn pdf_response(file: BookFile, disposition: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{}; filename=\"{}\"", disposition, file.filename),
            ),
            (header::CONTENT_LENGTH, file.len.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file.file)),
    )
        .into_response()
}
