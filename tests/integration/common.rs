//! Shared helpers: an in-process app over a temporary database and sections dir

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use lms_server::{
    api,
    config::AppConfig,
    connect_database,
    models::{section::Section, user::Credentials},
    AppState, MIGRATOR,
};

pub const BOUNDARY: &str = "lms-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as `new`, with a chance to adjust the config before the app starts
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", dir.path().join("lms.db").display());
        config.database.min_connections = 1;
        config.storage.sections_dir = dir.path().join("Sections").to_string_lossy().into_owned();
        config.auth.session_secret = "test-secret".to_string();
        adjust(&mut config);

        let pool = connect_database(&config.database)
            .await
            .expect("Failed to open database");
        MIGRATOR.run(&pool).await.expect("Failed to run migrations");

        let state = AppState::new(config, pool);
        let app = api::router(state.clone());

        Self { app, state, dir }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap()).await
    }

    /// Bootstrap a librarian account and sign in
    pub async fn librarian_cookie(&self) -> String {
        let credentials = Credentials {
            username: "admin".to_string(),
            password: "admin-pass".to_string(),
        };
        self.state
            .services
            .auth
            .register_librarian(&credentials, None)
            .await
            .expect("Failed to register librarian");

        let response = self
            .post_form("/librarian/login", "username=admin&password=admin-pass", None)
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        session_cookie(&response)
    }

    /// Register a user and sign in
    pub async fn user_cookie(&self, username: &str) -> String {
        let form = format!("username={}&password=secret", username);
        let response = self.post_form("/user/register", &form, None).await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let response = self.post_form("/user/login", &form, None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        session_cookie(&response)
    }

    /// Create a section through the dashboard and return it
    pub async fn create_section(&self, cookie: &str, name: &str) -> Section {
        let form = format!("section_name={}&description=Shelf", name);
        let response = self.post_form("/librarian/dashboard", &form, Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);

        self.state
            .services
            .catalog
            .list_sections()
            .await
            .unwrap()
            .into_iter()
            .last()
            .expect("Section was not created")
    }

    pub async fn upload(&self, cookie: &str, section_id: i64, filename: &str, data: &[u8]) -> Response {
        let body = multipart_body(&[("book_name", "Dune"), ("author", "Herbert"), ("content", "Spice")], filename, data);
        let request = Request::builder()
            .method("POST")
            .uri(format!("/section_books/{}", section_id))
            .header(header::COOKIE, cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Upload a PDF and return the new book id
    pub async fn upload_pdf(&self, cookie: &str, section_id: i64) -> i64 {
        let response = self.upload(cookie, section_id, "dune.pdf", b"%PDF-1.4 dune").await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let books = self.state.services.catalog.section_books(section_id).await.unwrap();
        books.books.last().expect("Book was not created").id
    }

    /// A pool of its own on the same database file
    pub async fn second_pool(&self) -> SqlitePool {
        SqlitePool::connect(&self.state.config.database.url)
            .await
            .expect("Failed to open second pool")
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(&self.state.services.repository.pool)
            .await
            .unwrap()
    }
}

/// `name=value` of the session cookie set by a response
pub fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("No session cookie set")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("No Location header")
        .to_str()
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Failed to parse JSON body")
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("Body is not UTF-8")
}

pub fn multipart_body(fields: &[(&str, &str)], filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"pdf_file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
