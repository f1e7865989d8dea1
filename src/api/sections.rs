//! Section endpoints for librarians and users

use axum::{
    extract::{Path, State},
    response::Response,
    Form, Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::SectionBooks,
        section::{CreateSection, Section},
        user::Role,
    },
    AppState,
};

use super::{found, LibrarianSession, UserSession};

/// Librarian dashboard: all sections
#[utoipa::path(
    get,
    path = "/librarian/dashboard",
    tag = "sections",
    responses(
        (status = 200, description = "All sections", body = Vec<Section>),
        (status = 302, description = "Not signed in as librarian")
    )
)]
pub async fn librarian_dashboard(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
) -> AppResult<Json<Vec<Section>>> {
    let sections = state.services.catalog.list_sections().await?;
    Ok(Json(sections))
}

/// Create a section and its directory
#[utoipa::path(
    post,
    path = "/librarian/dashboard",
    tag = "sections",
    request_body(content = CreateSection, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Section created, redirect to the dashboard"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_section(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
    Form(data): Form<CreateSection>,
) -> AppResult<Response> {
    data.validate()?;
    state.services.catalog.create_section(&data).await?;
    Ok(found(Role::Librarian.dashboard_path()))
}

/// Delete a section, its books and its directory
#[utoipa::path(
    post,
    path = "/delete_section/{section_id}",
    tag = "sections",
    params(("section_id" = i64, Path, description = "Section ID")),
    responses(
        (status = 302, description = "Redirect to the dashboard")
    )
)]
pub async fn delete_section(
    State(state): State<AppState>,
    LibrarianSession(_session): LibrarianSession,
    Path(section_id): Path<i64>,
) -> AppResult<Response> {
    state.services.catalog.delete_section(section_id).await?;
    Ok(found(Role::Librarian.dashboard_path()))
}

/// Back to the librarian dashboard
#[utoipa::path(
    get,
    path = "/back_to_dashboard",
    tag = "sections",
    responses(
        (status = 302, description = "Redirect to the librarian dashboard")
    )
)]
pub async fn back_to_dashboard() -> Response {
    found(Role::Librarian.dashboard_path())
}

/// User dashboard: all sections
#[utoipa::path(
    get,
    path = "/user/dashboard",
    tag = "sections",
    responses(
        (status = 200, description = "All sections", body = Vec<Section>)
    )
)]
pub async fn user_dashboard(State(state): State<AppState>) -> AppResult<Json<Vec<Section>>> {
    let sections = state.services.catalog.list_sections().await?;
    Ok(Json(sections))
}

/// Books of a section, as seen by a user
#[utoipa::path(
    get,
    path = "/user/section_books/{section_id}",
    tag = "sections",
    params(("section_id" = i64, Path, description = "Section ID")),
    responses(
        (status = 200, description = "Section and its books", body = SectionBooks),
        (status = 302, description = "Not signed in as user"),
        (status = 404, description = "Section not found")
    )
)]
pub async fn user_section_books(
    State(state): State<AppState>,
    UserSession(_session): UserSession,
    Path(section_id): Path<i64>,
) -> AppResult<Json<SectionBooks>> {
    let books = state.services.catalog.section_books(section_id).await?;
    Ok(Json(books))
}
