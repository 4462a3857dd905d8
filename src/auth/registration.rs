use std::path::Path;

use error_stack::{report, Result, ResultExt};
use reqwest::Url;
use serde::Deserialize;

use crate::config::ConfigError;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// OAuth client registration for an installed application, as issued by the
/// Google Cloud console. Loaded once and immutable for the process lifetime.
#[derive(Deserialize, Debug, Clone)]
pub struct ClientRegistration {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: ClientRegistration,
}

impl ClientRegistration {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let registration_error = || ConfigError::Registration {
            path: path.display().to_string(),
        };

        let raw = std::fs::read_to_string(path).change_context_lazy(registration_error)?;
        let parsed: ClientSecretFile =
            serde_json::from_str(&raw).change_context_lazy(registration_error)?;
        parsed.installed.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.client_id.is_empty() {
            return Err(report!(ConfigError::MissingField { field: "client_id" }));
        }
        if self.client_secret.is_empty() {
            return Err(report!(ConfigError::MissingField {
                field: "client_secret"
            }));
        }
        if self.redirect_uris.first().map_or(true, String::is_empty) {
            return Err(report!(ConfigError::MissingField {
                field: "redirect_uris"
            }));
        }
        Ok(self)
    }

    /// The first registered redirect endpoint is the one used for the flow.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uris[0]
    }

    /// Consent URL the operator opens in a browser. Offline access is
    /// requested so the exchange yields a refresh token.
    pub fn authorization_url(&self) -> String {
        let mut url = Url::parse(AUTHORIZATION_ENDPOINT).expect("static endpoint URL is valid");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("scope", SPREADSHEETS_SCOPE)
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri());
        url.into()
    }
}
