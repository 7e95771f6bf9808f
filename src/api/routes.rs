use axum::{
    extract::DefaultBodyLimit,
    http::HeaderName,
    routing::get,
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::ApiServerConfig;
use crate::errors::{Error, Result};
use crate::services::{CredentialService, ExporterService, TenantResolver};
use crate::storage::Repositories;

use super::{
    handlers::{
        delete_credential_handler, delete_exporter_handler, get_credential_handler,
        get_exporter_handler, health_handler, list_credentials_handler, list_exporters_handler,
        write_credentials_handler, write_exporters_handler,
    },
    tenant::{HeaderTenant, PathTenant},
};

#[derive(Clone)]
pub struct ApiState {
    pub tenants: TenantResolver,
    pub credentials: CredentialService,
    pub exporters: ExporterService,
    /// Header carrying the tenant name on header-scoped routes
    pub tenant_header: HeaderName,
}

impl ApiState {
    pub fn new(repositories: Repositories, tenant_header: HeaderName) -> Self {
        Self {
            tenants: TenantResolver::new(repositories.tenants),
            credentials: CredentialService::new(repositories.credentials.clone()),
            exporters: ExporterService::new(repositories.exporters, repositories.credentials),
            tenant_header,
        }
    }
}

pub fn build_router(repositories: Repositories, config: &ApiServerConfig) -> Result<Router> {
    let tenant_header = HeaderName::from_bytes(config.tenant_header.as_bytes()).map_err(|e| {
        Error::config(format!("Invalid tenant header '{}': {}", config.tenant_header, e))
    })?;
    let api_state = ApiState::new(repositories, tenant_header);

    let tenant_scoped = Router::new()
        .route(
            "/api/v1/tenants/{tenant}/credentials",
            get(list_credentials_handler::<PathTenant>)
                .post(write_credentials_handler::<PathTenant>),
        )
        .route(
            "/api/v1/tenants/{tenant}/credentials/{name}",
            get(get_credential_handler::<PathTenant>)
                .delete(delete_credential_handler::<PathTenant>),
        )
        .route(
            "/api/v1/tenants/{tenant}/exporters",
            get(list_exporters_handler::<PathTenant>).post(write_exporters_handler::<PathTenant>),
        )
        .route(
            "/api/v1/tenants/{tenant}/exporters/{name}",
            get(get_exporter_handler::<PathTenant>).delete(delete_exporter_handler::<PathTenant>),
        );

    let header_scoped = Router::new()
        .route(
            "/api/v1/credentials",
            get(list_credentials_handler::<HeaderTenant>)
                .post(write_credentials_handler::<HeaderTenant>),
        )
        .route(
            "/api/v1/credentials/{name}",
            get(get_credential_handler::<HeaderTenant>)
                .delete(delete_credential_handler::<HeaderTenant>),
        )
        .route(
            "/api/v1/exporters",
            get(list_exporters_handler::<HeaderTenant>)
                .post(write_exporters_handler::<HeaderTenant>),
        )
        .route(
            "/api/v1/exporters/{name}",
            get(get_exporter_handler::<HeaderTenant>)
                .delete(delete_exporter_handler::<HeaderTenant>),
        );

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(tenant_scoped)
        .merge(header_scoped)
        .with_state(api_state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
