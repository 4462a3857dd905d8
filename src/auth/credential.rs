use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A delegated-authorization token pair plus metadata, as produced by the
/// token endpoint. Never mutated in place: refreshing yields a new instance.
/// This is also the shape of the on-disk cache artifact.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCredential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub token_type: String,
    /// Absolute expiry instant, derived from the endpoint's relative
    /// `expires_in` at exchange time. Absent when the endpoint gave none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizationCredential {
    /// A credential without expiry metadata is treated as still valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.map_or(false, |expiry| expiry <= now)
    }
}
