//! # Storage and Persistence
//!
//! Repository traits for tenants, credentials and exporters, with a
//! GraphQL-backed implementation for production and an in-memory one for
//! tests and local runs.

pub mod memory;
pub mod repositories;

use std::sync::Arc;

pub use memory::InMemoryStore;
pub use repositories::{
    CredentialRepository, ExporterRepository, GraphqlCredentialRepository,
    GraphqlExporterRepository, GraphqlTenantRepository, TenantRepository,
};

use crate::graphql::GraphqlExecutor;

/// The set of repositories a request handler works against
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub credentials: Arc<dyn CredentialRepository>,
    pub exporters: Arc<dyn ExporterRepository>,
}

impl Repositories {
    /// Repositories backed by a GraphQL executor
    pub fn graphql(executor: Arc<dyn GraphqlExecutor>) -> Self {
        Self {
            tenants: Arc::new(GraphqlTenantRepository::new(executor.clone())),
            credentials: Arc::new(GraphqlCredentialRepository::new(executor.clone())),
            exporters: Arc::new(GraphqlExporterRepository::new(executor)),
        }
    }

    /// Repositories sharing one in-memory store
    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            tenants: Arc::new(store.clone()),
            credentials: Arc::new(store.clone()),
            exporters: Arc::new(store),
        }
    }
}
