//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, requests, sections};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LMS API",
        version = "0.1.0",
        description = "Library Management System: sections, PDF books and borrow requests"
    ),
    paths(
        // Health
        health::index,
        health::health_check,
        health::readiness_check,
        // Auth
        auth::librarian_login,
        auth::register_librarian,
        auth::user_login,
        auth::register_user,
        auth::logout,
        // Sections
        sections::librarian_dashboard,
        sections::create_section,
        sections::delete_section,
        sections::back_to_dashboard,
        sections::user_dashboard,
        sections::user_section_books,
        // Books
        books::section_books,
        books::upload_book,
        books::delete_book,
        books::download_book,
        books::view_book,
        // Requests
        requests::request_queue,
        requests::process_request,
        requests::revoke_request,
        requests::request_book,
        requests::my_books,
    ),
    components(
        schemas(
            crate::models::user::Credentials,
            crate::models::user::Role,
            crate::models::section::Section,
            crate::models::section::CreateSection,
            crate::models::book::Book,
            crate::models::book::SectionBooks,
            crate::models::book::UploadBookForm,
            crate::models::request::RequestAction,
            crate::models::request::RequestState,
            crate::models::request::ProcessRequestForm,
            crate::models::request::RequestDetails,
            crate::models::request::RequestQueue,
            crate::models::request::BookRef,
            crate::models::request::MyBooks,
            crate::models::request::UserBook,
            super::FormResult,
            health::HealthResponse,
            health::IndexResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Home and health check endpoints"),
        (name = "auth", description = "Login, registration and logout"),
        (name = "sections", description = "Section management and browsing"),
        (name = "books", description = "Book upload and PDF delivery"),
        (name = "requests", description = "Borrow request workflow")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
