pub mod app_config;
pub mod auth_config;
pub mod sheets_config;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load configuration from '{path}'")]
    Load { path: String },
    #[error("client registration at '{path}' is malformed")]
    Registration { path: String },
    #[error("missing client registration field: {field}")]
    MissingField { field: &'static str },
}
