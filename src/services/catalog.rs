//! Sections and books: database rows plus their files on disk

use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookMetadata, SectionBooks, UploadedFile},
        section::{CreateSection, Section},
    },
    repository::Repository,
};

use super::storage::FileStore;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    store: FileStore,
}

/// PDF ready to be streamed to the client
pub struct BookFile {
    pub filename: String,
    pub file: tokio::fs::File,
    pub len: u64,
}

impl CatalogService {
    pub fn new(repository: Repository, store: FileStore) -> Self {
        Self { repository, store }
    }

    pub async fn list_sections(&self) -> AppResult<Vec<Section>> {
        self.repository.sections.list().await
    }

    pub async fn get_section(&self, id: i64) -> AppResult<Section> {
        self.repository
            .sections
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Section not found".to_string()))
    }

    /// Create the section directory, then its row
    pub async fn create_section(&self, data: &CreateSection) -> AppResult<Section> {
        let dir = self.store.create_section_dir(&data.section_name).await?;
        let dir_str = dir.to_string_lossy().into_owned();

        match self
            .repository
            .sections
            .create(&data.section_name, &data.description, &dir_str)
            .await
        {
            Ok(section) => {
                tracing::info!(section_id = section.id, directory = %dir_str, "Section created");
                Ok(section)
            }
            Err(e) => {
                // Do not leave an unreferenced directory behind
                if let Err(cleanup) = self.store.remove_dir(&dir).await {
                    tracing::warn!("Failed to remove directory {}: {}", dir_str, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Delete a section row, its books, and its directory. Unknown ids are ignored.
    pub async fn delete_section(&self, id: i64) -> AppResult<()> {
        let Some(section) = self.repository.sections.get_by_id(id).await? else {
            tracing::debug!(section_id = id, "Delete of unknown section ignored");
            return Ok(());
        };

        self.repository.sections.delete(id).await?;
        self.store.remove_dir(Path::new(&section.directory_path)).await?;
        tracing::info!(section_id = id, "Section deleted");
        Ok(())
    }

    pub async fn section_books(&self, section_id: i64) -> AppResult<SectionBooks> {
        let section = self.get_section(section_id).await?;
        let books = self.repository.books.list_by_section(section_id).await?;
        Ok(SectionBooks { section, books })
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Store an uploaded PDF in the section directory and record the book.
    ///
    /// Returns `None` when the file is not an acceptable PDF; nothing is
    /// written in that case.
    pub async fn upload_book(
        &self,
        section_id: i64,
        metadata: &BookMetadata,
        file: &UploadedFile,
    ) -> AppResult<Option<Book>> {
        let section = self.get_section(section_id).await?;

        let Some(path) = self
            .store
            .save_pdf(Path::new(&section.directory_path), &file.filename, &file.data)
            .await?
        else {
            tracing::warn!(section_id, filename = %file.filename, "Rejected upload: not a PDF");
            return Ok(None);
        };
        let path_str = path.to_string_lossy().into_owned();

        match self.repository.books.create(section_id, metadata, &path_str).await {
            Ok(book) => {
                tracing::info!(book_id = book.id, file = %path_str, "Book uploaded");
                Ok(Some(book))
            }
            Err(e) => {
                if let Err(cleanup) = self.store.remove_file(&path).await {
                    tracing::warn!("Failed to remove file {}: {}", path_str, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Delete the book file, then its row. Returns the deleted book, if any.
    pub async fn delete_book(&self, id: i64) -> AppResult<Option<Book>> {
        let Some(book) = self.repository.books.get_by_id(id).await? else {
            tracing::debug!(book_id = id, "Delete of unknown book ignored");
            return Ok(None);
        };

        self.store.remove_file(Path::new(&book.file_path)).await?;
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(Some(book))
    }

    /// Open the PDF of a book
    pub async fn book_file(&self, id: i64) -> AppResult<BookFile> {
        let book = self.get_book(id).await?;
        let path = Path::new(&book.file_path);

        let (file, len) = self
            .store
            .open(path)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("book-{}.pdf", book.id));

        Ok(BookFile { filename, file, len })
    }
}
