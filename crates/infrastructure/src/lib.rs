//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod connection_settings;
mod postgres_catalog_session;

pub use connection_settings::{ConnectionSettings, DEFAULT_PORT};
pub use postgres_catalog_session::PostgresCatalogSession;
