use config::Config;
use error_stack::{Result, ResultExt};

use super::{auth_config::AuthConfig, sheets_config::SpreadsheetConfig, ConfigError};

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub spreadsheet: SpreadsheetConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .change_context_lazy(|| ConfigError::Load {
                path: path.to_owned(),
            })?
            .try_deserialize()
            .change_context_lazy(|| ConfigError::Load {
                path: path.to_owned(),
            })
    }
}
