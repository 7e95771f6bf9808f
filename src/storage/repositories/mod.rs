//! Repository modules for data access
//!
//! One file per entity. Each defines the repository trait and its GraphQL
//! implementation.

pub mod credential;
pub mod exporter;
pub mod tenant;

pub use credential::{CredentialRepository, GraphqlCredentialRepository};
pub use exporter::{ExporterRepository, GraphqlExporterRepository};
pub use tenant::{GraphqlTenantRepository, TenantRepository};
