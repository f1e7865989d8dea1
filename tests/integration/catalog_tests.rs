//! Sections, book uploads and PDF delivery

use std::path::Path;

use axum::http::{header, StatusCode};
use lms_server::models::{
    book::{BookMetadata, UploadedFile},
    section::CreateSection,
};

use crate::common::{body_bytes, body_json, body_text, location, TestApp};

fn section_form(name: &str) -> CreateSection {
    CreateSection {
        section_name: name.to_string(),
        description: String::new(),
    }
}

fn pdf(filename: &str) -> UploadedFile {
    UploadedFile {
        filename: filename.to_string(),
        data: b"%PDF-1.4".to_vec(),
    }
}

fn metadata() -> BookMetadata {
    BookMetadata {
        book_name: "Atlas".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_section_makes_directory() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;

    let section = app.create_section(&cookie, "Science+Fiction").await;
    assert_eq!(section.name, "Science Fiction");
    assert_eq!(section.description, "Shelf");

    let dir = Path::new(&section.directory_path);
    assert!(dir.is_dir());
    assert!(dir.starts_with(app.dir.path().join("Sections")));
    assert_eq!(dir.file_name().unwrap(), "Science_Fiction");

    let response = app.get("/librarian/dashboard", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body[0]["name"], "Science Fiction");
    assert!(body[0].get("directory_path").is_none());

    // Users see the same sections
    let response = app.get("/user/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_section_name_cannot_escape_storage() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;

    let section = app.create_section(&cookie, "..%2F..%2Fescape").await;
    let dir = Path::new(&section.directory_path);
    assert!(dir.starts_with(app.dir.path().join("Sections")));
    assert!(!app.dir.path().join("escape").exists());
}

#[tokio::test]
async fn test_delete_section_removes_directory_and_books() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;
    let section = app.create_section(&cookie, "History").await;
    let book_id = app.upload_pdf(&cookie, section.id).await;
    let book = app.state.services.catalog.get_book(book_id).await.unwrap();
    assert!(Path::new(&book.file_path).is_file());

    let response = app
        .post_form(&format!("/delete_section/{}", section.id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/librarian/dashboard");

    assert!(!Path::new(&section.directory_path).exists());
    assert_eq!(app.count("SELECT COUNT(*) FROM sections").await, 0);
    assert_eq!(app.count("SELECT COUNT(*) FROM books").await, 0);
}

#[tokio::test]
async fn test_delete_unknown_section_is_noop() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;

    let response = app.post_form("/delete_section/999", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/librarian/dashboard");
}

#[tokio::test]
async fn test_upload_pdf() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;
    let section = app.create_section(&cookie, "Novels").await;

    let response = app.upload(&cookie, section.id, "My Book.PDF", b"%PDF-1.7").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/section_books/{}", section.id));

    let books = app.state.services.catalog.section_books(section.id).await.unwrap();
    assert_eq!(books.books.len(), 1);
    let book = &books.books[0];
    assert_eq!(book.name, "Dune");
    assert_eq!(book.author, "Herbert");
    assert_eq!(book.content, "Spice");

    let path = Path::new(&book.file_path);
    assert!(path.starts_with(&section.directory_path));
    assert_eq!(path.file_name().unwrap(), "My_Book.PDF");
    assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.7");

    let response = app
        .get(&format!("/section_books/{}", section.id), Some(&cookie))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["section"]["id"], section.id);
    assert_eq!(body["books"][0]["name"], "Dune");

    let response = app
        .get(&format!("/view_books/{}", section.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_same_name_keeps_both_files() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;
    let section = app.create_section(&cookie, "Poetry").await;

    app.upload(&cookie, section.id, "verse.pdf", b"first").await;
    app.upload(&cookie, section.id, "verse.pdf", b"second").await;

    let books = app.state.services.catalog.section_books(section.id).await.unwrap();
    assert_eq!(books.books.len(), 2);
    assert_ne!(books.books[0].file_path, books.books[1].file_path);
    assert_eq!(std::fs::read(&books.books[0].file_path).unwrap(), b"first");
    assert_eq!(std::fs::read(&books.books[1].file_path).unwrap(), b"second");
}

#[tokio::test]
async fn test_upload_non_pdf_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;
    let section = app.create_section(&cookie, "Misc").await;

    let response = app.upload(&cookie, section.id, "notes.txt", b"hello").await;
    assert_eq!(response.status(), StatusCode::FOUND);

    assert_eq!(app.state.services.repository.books.count().await.unwrap(), 0);
    let entries = std::fs::read_dir(&section.directory_path).unwrap().count();
    assert_eq!(entries, 0);
}

#[tokio::test]
async fn test_upload_to_unknown_section() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;

    let response = app.upload(&cookie, 42, "book.pdf", b"%PDF").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Section not found");
}

#[tokio::test]
async fn test_upload_requires_librarian() {
    let app = TestApp::new().await;
    let librarian = app.librarian_cookie().await;
    let section = app.create_section(&librarian, "Locked").await;
    let user = app.user_cookie("eve").await;

    let response = app.upload(&user, section.id, "book.pdf", b"%PDF").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/librarian/login");
    assert_eq!(app.state.services.repository.books.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_book_removes_file() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;
    let section = app.create_section(&cookie, "Art").await;
    let book_id = app.upload_pdf(&cookie, section.id).await;
    let book = app.state.services.catalog.get_book(book_id).await.unwrap();

    let response = app
        .post_form(&format!("/delete_book/{}", book_id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/section_books/{}", section.id));

    assert!(!Path::new(&book.file_path).exists());
    assert_eq!(app.state.services.repository.books.count().await.unwrap(), 0);

    // Already gone
    let response = app
        .post_form(&format!("/delete_book/{}", book_id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/librarian/dashboard");
}

#[tokio::test]
async fn test_delete_book_with_missing_file() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;
    let section = app.create_section(&cookie, "Maps").await;
    let book_id = app.upload_pdf(&cookie, section.id).await;
    let book = app.state.services.catalog.get_book(book_id).await.unwrap();
    std::fs::remove_file(&book.file_path).unwrap();

    let response = app
        .post_form(&format!("/delete_book/{}", book_id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(app.state.services.repository.books.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_librarian_download() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;
    let section = app.create_section(&cookie, "Music").await;
    let book_id = app.upload_pdf(&cookie, section.id).await;

    let response = app
        .get(&format!("/section_books_download/{}", book_id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"dune.pdf\""
    );
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "13");
    assert_eq!(body_bytes(response).await, b"%PDF-1.4 dune");

    let response = app
        .get(&format!("/section_books_view/{}", book_id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"dune.pdf\""
    );
}

#[tokio::test]
async fn test_download_not_found() {
    let app = TestApp::new().await;
    let cookie = app.librarian_cookie().await;

    let response = app.get("/section_books_download/7", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Book not found");

    let section = app.create_section(&cookie, "Lost").await;
    let book_id = app.upload_pdf(&cookie, section.id).await;
    let book = app.state.services.catalog.get_book(book_id).await.unwrap();
    std::fs::remove_file(&book.file_path).unwrap();

    let response = app
        .get(&format!("/section_books_download/{}", book_id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "File not found");
}

#[tokio::test]
async fn test_anonymous_download_is_sent_to_login() {
    let app = TestApp::new().await;

    let response = app.get("/section_books_download/1", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/librarian/login");

    let response = app.get("/section_books_view/1", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/user/login");
}

#[tokio::test]
async fn test_user_section_books() {
    let app = TestApp::new().await;
    let librarian = app.librarian_cookie().await;
    let section = app.create_section(&librarian, "Travel").await;
    app.upload_pdf(&librarian, section.id).await;

    let uri = format!("/user/section_books/{}", section.id);
    let response = app.get(&uri, None).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let user = app.user_cookie("frank").await;
    let response = app.get(&uri, Some(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["section"]["name"], "Travel");
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
    assert!(body["books"][0].get("file_path").is_none());

    let response = app.get("/user/section_books/999", Some(&user)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_created_rows_are_visible_to_other_connections() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;
    let other = app.second_pool().await;

    for i in 1..=20i64 {
        let section = catalog.create_section(&section_form(&format!("Shelf {}", i))).await.unwrap();
        let sections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sections")
            .fetch_one(&other)
            .await
            .unwrap();
        assert_eq!(sections, i);

        catalog
            .upload_book(section.id, &metadata(), &pdf("atlas.pdf"))
            .await
            .unwrap()
            .unwrap();
        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&other)
            .await
            .unwrap();
        assert_eq!(books, i);
    }
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::with_config(|config| config.storage.max_upload_bytes = 1024).await;
    let cookie = app.librarian_cookie().await;
    let section = app.create_section(&cookie, "Big").await;

    let response = app.upload(&cookie, section.id, "huge.pdf", &vec![b'x'; 100 * 1024]).await;
    assert!(response.status().is_client_error());

    assert_eq!(app.state.services.repository.books.count().await.unwrap(), 0);
    let entries = std::fs::read_dir(&section.directory_path).unwrap().count();
    assert_eq!(entries, 0);
}

#[tokio::test]
async fn test_failed_section_insert_removes_directory() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let first = catalog.create_section(&section_form("Atlas")).await.unwrap();
    std::fs::remove_dir(&first.directory_path).unwrap();

    // Same directory path again, so the row insert hits the unique constraint
    let result = catalog.create_section(&section_form("Atlas")).await;
    assert!(result.is_err());
    assert!(!Path::new(&first.directory_path).exists());
    assert_eq!(app.count("SELECT COUNT(*) FROM sections").await, 1);
}

#[tokio::test]
async fn test_failed_book_insert_removes_file() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;
    let section = catalog.create_section(&section_form("Maps")).await.unwrap();

    let first = catalog
        .upload_book(section.id, &metadata(), &pdf("atlas.pdf"))
        .await
        .unwrap()
        .unwrap();
    std::fs::remove_file(&first.file_path).unwrap();

    let result = catalog.upload_book(section.id, &metadata(), &pdf("atlas.pdf")).await;
    assert!(result.is_err());
    assert!(!Path::new(&first.file_path).exists());
    assert_eq!(app.state.services.repository.books.count().await.unwrap(), 1);
}
