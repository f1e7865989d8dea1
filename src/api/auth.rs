//! Login, registration and logout endpoints

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{Credentials, Role},
    AppState,
};

use super::{found, CurrentSession, FormResult};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

fn session_cookie(name: &str, token: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Set the session cookie and go to the role's dashboard, or re-render the form
fn login_response(state: &AppState, jar: CookieJar, token: Option<String>, role: Role) -> Response {
    match token {
        Some(token) => {
            let jar = jar.add(session_cookie(state.services.auth.cookie_name(), token));
            (jar, found(role.dashboard_path())).into_response()
        }
        None => {
            tracing::info!(role = %role, "Failed login attempt");
            Json(FormResult::error(INVALID_CREDENTIALS)).into_response()
        }
    }
}

/// Librarian login
#[utoipa::path(
    post,
    path = "/librarian/login",
    tag = "auth",
    request_body(content = Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Logged in, redirect to the librarian dashboard"),
        (status = 200, description = "Invalid credentials", body = FormResult)
    )
)]
pub async fn librarian_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    let token = state.services.auth.login_librarian(&credentials).await?;
    Ok(login_response(&state, jar, token, Role::Librarian))
}

/// Register a librarian (librarian session required once one exists)
#[utoipa::path(
    post,
    path = "/librarian/register",
    tag = "auth",
    request_body(content = Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Registered, redirect to the librarian dashboard"),
        (status = 200, description = "Librarian already exists", body = FormResult)
    )
)]
pub async fn register_librarian(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    credentials.validate()?;

    match state
        .services
        .auth
        .register_librarian(&credentials, session.as_ref())
        .await
    {
        Ok(()) => Ok(found(Role::Librarian.dashboard_path())),
        Err(AppError::Conflict(msg)) => Ok(Json(FormResult::error(msg)).into_response()),
        Err(e) => Err(e),
    }
}

/// User login
#[utoipa::path(
    post,
    path = "/user/login",
    tag = "auth",
    request_body(content = Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Logged in, redirect to the user dashboard"),
        (status = 200, description = "Invalid credentials", body = FormResult)
    )
)]
pub async fn user_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    let token = state.services.auth.login_user(&credentials).await?;
    Ok(login_response(&state, jar, token, Role::User))
}

/// Register a user
#[utoipa::path(
    post,
    path = "/user/register",
    tag = "auth",
    request_body(content = Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Registered, redirect to the user login"),
        (status = 200, description = "Username already taken", body = FormResult),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    credentials.validate()?;

    match state.services.auth.register_user(&credentials).await {
        Ok(()) => Ok(found(Role::User.login_path())),
        Err(AppError::Conflict(msg)) => Ok(Json(FormResult::error(msg)).into_response()),
        Err(e) => Err(e),
    }
}

/// Clear the session
#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 302, description = "Logged out, redirect to the home page")
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build((state.services.auth.cookie_name().to_string(), "")).path("/"));
    (jar, found("/")).into_response()
}
