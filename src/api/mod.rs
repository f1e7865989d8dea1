//! HTTP handlers, session extractors and the router

pub mod auth;
pub mod books;
pub mod health;
pub mod openapi;
pub mod requests;
pub mod sections;

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::user::{Role, SessionClaims},
    AppState,
};

/// 302 Found redirect
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Re-rendered form carrying an error message
#[derive(Serialize, ToSchema)]
pub struct FormResult {
    pub error: Option<String>,
}

impl FormResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }
}

/// Session of the caller, if any valid one was presented
pub struct CurrentSession(pub Option<SessionClaims>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let auth = &state.services.auth;
        let claims = jar
            .get(auth.cookie_name())
            .and_then(|cookie| auth.decode_session(cookie.value()));
        Ok(CurrentSession(claims))
    }
}

/// Extractor for a signed-in librarian; anyone else is sent to the librarian login
pub struct LibrarianSession(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for LibrarianSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentSession(claims) = CurrentSession::from_request_parts(parts, state)
            .await
            .unwrap_or(CurrentSession(None));
        match claims {
            Some(claims) if claims.role == Role::Librarian => Ok(LibrarianSession(claims)),
            _ => Err(AppError::LoginRequired(Role::Librarian)),
        }
    }
}

/// Extractor for a signed-in user; anyone else is sent to the user login
pub struct UserSession(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for UserSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentSession(claims) = CurrentSession::from_request_parts(parts, state)
            .await
            .unwrap_or(CurrentSession(None));
        match claims {
            Some(claims) if claims.role == Role::User => Ok(UserSession(claims)),
            _ => Err(AppError::LoginRequired(Role::User)),
        }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.storage.max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/logout", get(auth::logout))
        // Librarian
        .route("/librarian/login", post(auth::librarian_login))
        .route("/librarian/register", post(auth::register_librarian))
        .route(
            "/librarian/dashboard",
            get(sections::librarian_dashboard).post(sections::create_section),
        )
        .route("/back_to_dashboard", get(sections::back_to_dashboard))
        .route("/delete_section/:section_id", post(sections::delete_section))
        .route("/view_books/:section_id", get(books::section_books))
        .route(
            "/section_books/:section_id",
            get(books::section_books).post(books::upload_book),
        )
        .route("/section_books_download/:book_id", get(books::download_book))
        .route("/section_books_view/:book_id", get(books::view_book))
        .route("/delete_book/:book_id", post(books::delete_book))
        .route(
            "/librarian/process_request",
            get(requests::request_queue).post(requests::process_request),
        )
        .route(
            "/librarian/revoke_request/:book_id/:username",
            post(requests::revoke_request),
        )
        // User
        .route("/user/login", post(auth::user_login))
        .route("/user/register", post(auth::register_user))
        .route("/user/dashboard", get(sections::user_dashboard))
        .route("/user/section_books/:section_id", get(sections::user_section_books))
        .route("/user/request_book/:book_id", post(requests::request_book))
        .route("/user/my_books", get(requests::my_books))
        .with_state(state);

    routes
        .merge(openapi::create_openapi_router())
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
