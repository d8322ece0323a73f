//! Shared configuration and seed data for esglens.
//!
//! Holds the environment-driven application config, the versioned
//! sustainability-topic catalog seeded into the store on first
//! initialization, and the tracked-organizations seed file model.

mod app_config;
mod catalog;
mod config;
pub mod organizations;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{TOPIC_CATALOG, TOPIC_CATALOG_VERSION};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read organizations file {path}: {source}")]
    OrganizationsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse organizations file: {0}")]
    OrganizationsFileParse(#[from] serde_yaml::Error),

    #[error("{0}")]
    Validation(String),
}
