use async_trait::async_trait;
use chrono::{Duration, Utc};
use error_stack::{Result, ResultExt};
use serde::Deserialize;

use super::broker::AuthExchangeError;
use super::credential::AuthorizationCredential;
use super::registration::ClientRegistration;

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Collaborator for the remote token endpoint: trades a one-time
/// authorization code (or a refresh token) for a credential.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange_code(
        &self,
        registration: &ClientRegistration,
        code: &str,
    ) -> Result<AuthorizationCredential, AuthExchangeError>;

    async fn refresh(
        &self,
        registration: &ClientRegistration,
        refresh_token: &str,
    ) -> Result<AuthorizationCredential, AuthExchangeError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    token_type: String,
}

impl TokenResponse {
    /// The refresh grant usually omits the refresh token; carry the previous
    /// one forward so the credential stays refreshable.
    fn into_credential(self, previous_refresh_token: Option<&str>) -> AuthorizationCredential {
        AuthorizationCredential {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_owned)),
            scope: self.scope,
            token_type: self.token_type,
            expiry: self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

pub struct HttpTokenExchanger {
    http: reqwest::Client,
}

impl HttpTokenExchanger {
    pub fn new(http: reqwest::Client) -> Self {
        HttpTokenExchanger { http }
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange_code(
        &self,
        registration: &ClientRegistration,
        code: &str,
    ) -> Result<AuthorizationCredential, AuthExchangeError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", registration.client_id.as_str()),
            ("client_secret", registration.client_secret.as_str()),
            ("redirect_uri", registration.redirect_uri()),
        ];

        let response: TokenResponse = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .change_context(AuthExchangeError::Exchange)?
            .error_for_status()
            .change_context(AuthExchangeError::Exchange)?
            .json()
            .await
            .change_context(AuthExchangeError::Exchange)?;

        Ok(response.into_credential(None))
    }

    async fn refresh(
        &self,
        registration: &ClientRegistration,
        refresh_token: &str,
    ) -> Result<AuthorizationCredential, AuthExchangeError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", registration.client_id.as_str()),
            ("client_secret", registration.client_secret.as_str()),
        ];

        let response: TokenResponse = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .change_context(AuthExchangeError::Refresh)?
            .error_for_status()
            .change_context(AuthExchangeError::Refresh)?
            .json()
            .await
            .change_context(AuthExchangeError::Refresh)?;

        Ok(response.into_credential(Some(refresh_token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_maps_to_credential() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "token-abc",
                "refresh_token": "refresh-def",
                "expires_in": 3599,
                "scope": "https://www.googleapis.com/auth/spreadsheets",
                "token_type": "Bearer"
            }"#,
        )
        .unwrap();

        let before = Utc::now();
        let credential = response.into_credential(None);

        assert_eq!(credential.access_token, "token-abc");
        assert_eq!(credential.refresh_token.as_deref(), Some("refresh-def"));
        assert_eq!(credential.token_type, "Bearer");
        let expiry = credential.expiry.unwrap();
        assert!(expiry >= before + Duration::seconds(3599));
        assert!(expiry <= Utc::now() + Duration::seconds(3599));
    }

    #[test]
    fn test_refresh_response_keeps_previous_refresh_token() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "token-new", "token_type": "Bearer"}"#,
        )
        .unwrap();

        let credential = response.into_credential(Some("refresh-def"));

        assert_eq!(credential.access_token, "token-new");
        assert_eq!(credential.refresh_token.as_deref(), Some("refresh-def"));
        assert_eq!(credential.expiry, None);
    }
}
