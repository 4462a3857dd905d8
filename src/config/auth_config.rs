use std::path::PathBuf;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AuthConfig {
    /// Path to the installed-app client secret file downloaded from the
    /// Google Cloud console.
    pub credentials_path: PathBuf,
    /// Where the token obtained on first run is cached for later runs.
    pub token_cache_path: PathBuf,
    /// When set, an expired cached token is refreshed before use instead of
    /// being sent as-is and failing at the query step.
    #[serde(default)]
    pub refresh_expired: bool,
}
