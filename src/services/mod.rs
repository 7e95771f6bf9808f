//! Business logic services
//!
//! Tenant resolution and the credential/exporter managers, separated from
//! HTTP and GraphQL concerns.

pub mod batch;
pub mod credential_service;
pub mod exporter_service;
pub mod tenant_resolver;

pub use batch::{EntityKind, WriteSummary};
pub use credential_service::CredentialService;
pub use exporter_service::ExporterService;
pub use tenant_resolver::TenantResolver;
