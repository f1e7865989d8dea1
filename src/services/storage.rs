//! Filesystem storage for section directories and uploaded PDFs

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::{fs, io::AsyncWriteExt};
use unicode_normalization::UnicodeNormalization;

use crate::error::AppResult;

/// Extensions accepted for upload
const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename pattern"));

/// Whether `filename` carries an allowed extension (case-insensitive)
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied name to a single safe path component.
///
/// May return an empty string when nothing usable is left.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Section directories under one root
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a fresh directory for a section named `name`.
    ///
    /// An existing directory of the same name gets a `_N` suffix instead of
    /// being shared.
    pub async fn create_section_dir(&self, name: &str) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.root).await?;

        let mut base = secure_filename(name);
        if base.is_empty() {
            base = "section".to_string();
        }

        let mut attempt = 0u32;
        loop {
            let dir_name = if attempt == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, attempt)
            };
            let path = self.root.join(dir_name);
            match fs::create_dir(&path).await {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Recursively remove a directory; a missing one is not an error
    pub async fn remove_dir(&self, path: &Path) -> AppResult<bool> {
        match fs::remove_dir_all(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Write an uploaded PDF into `dir`.
    ///
    /// Returns `None` without touching the disk when the filename is not an
    /// acceptable PDF name. Never overwrites: a taken name gets a `_N`
    /// suffix before the extension.
    pub async fn save_pdf(&self, dir: &Path, filename: &str, data: &[u8]) -> AppResult<Option<PathBuf>> {
        if !allowed_file(filename) {
            return Ok(None);
        }
        let safe = secure_filename(filename);
        let Some((stem, ext)) = safe.rsplit_once('.') else {
            return Ok(None);
        };
        if stem.is_empty() || !allowed_file(&safe) {
            return Ok(None);
        }

        fs::create_dir_all(dir).await?;

        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                safe.clone()
            } else {
                format!("{}_{}.{}", stem, attempt, ext)
            };
            let path = dir.join(name);
            match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(data).await?;
                    file.flush().await?;
                    return Ok(Some(path));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Remove a file; a missing one is not an error
    pub async fn remove_file(&self, path: &Path) -> AppResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Open a file for streaming along with its size, `None` when it does not exist
    pub async fn open(&self, path: &Path) -> AppResult<Option<(fs::File, u64)>> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(Some((fs::File::open(path).await?, meta.len()))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
