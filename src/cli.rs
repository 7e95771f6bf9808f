//! # Command Line Interface
//!
//! Flags for the server binary. Each flag overrides the matching environment
//! setting.

use clap::Parser;

use crate::config::{parse_endpoint, Config};
use crate::errors::Result;

#[derive(Parser, Debug, Default)]
#[command(name = "tenant-config-api")]
#[command(about = "Tenant-scoped credential and exporter configuration API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Address to bind the API server to
    #[arg(long)]
    pub bind_address: Option<String>,

    /// Port to serve the API on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Header carrying the tenant name on header-scoped routes
    #[arg(long)]
    pub tenant_header: Option<String>,

    /// GraphQL endpoint URL
    #[arg(long)]
    pub graphql_endpoint: Option<String>,

    /// Default log filter (overridden by RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logging: bool,
}

impl Cli {
    /// Apply the flags on top of an environment-derived configuration and re-validate.
    pub fn apply(self, mut config: Config) -> Result<Config> {
        if let Some(bind_address) = self.bind_address {
            config.api.bind_address = bind_address;
        }
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(tenant_header) = self.tenant_header {
            config.api.tenant_header = tenant_header;
        }
        if let Some(endpoint) = self.graphql_endpoint {
            config.graphql.endpoint = parse_endpoint(&endpoint)?;
        }
        if let Some(log_level) = self.log_level {
            config.observability.log_level = log_level;
        }
        if self.json_logging {
            config.observability.json_logging = true;
        }

        config.validate()?;
        Ok(config)
    }
}
