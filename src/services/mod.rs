//! Business logic services

pub mod auth;
pub mod catalog;
pub mod requests;
pub mod storage;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub requests: requests::RequestsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, store: storage::FileStore) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone(), store),
            requests: requests::RequestsService::new(repository.clone()),
            repository,
        }
    }
}
