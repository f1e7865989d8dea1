//! LMS - Library Management System
//!
//! Librarians create sections and upload book PDFs; users browse sections,
//! request books and read the ones issued to them.

use std::{str::FromStr, sync::Arc};

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use config::DatabaseConfig;
use repository::Repository;
use services::{storage::FileStore, Services};

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
}

impl AppState {
    /// Wire repository and services over an open pool
    pub fn new(config: AppConfig, pool: SqlitePool) -> Self {
        let repository = Repository::new(pool);
        let store = FileStore::new(&config.storage.sections_dir);
        let services = Services::new(repository, config.auth.clone(), store);

        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}

/// Open the SQLite pool, creating the database file if needed
pub async fn connect_database(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_with(options)
        .await
}
