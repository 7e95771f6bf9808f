//! HTTP request handlers organized by resource type

pub mod credentials;
pub mod exporters;
pub mod health;

pub use credentials::{
    delete_credential_handler, get_credential_handler, list_credentials_handler,
    write_credentials_handler,
};
pub use exporters::{
    delete_exporter_handler, get_exporter_handler, list_exporters_handler,
    write_exporters_handler,
};
pub use health::health_handler;
