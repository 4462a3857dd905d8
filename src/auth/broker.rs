use std::path::PathBuf;

use chrono::Utc;
use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::{debug, info};

use super::credential::AuthorizationCredential;
use super::exchange::TokenExchanger;
use super::prompt::AuthorizationCodePrompt;
use super::registration::ClientRegistration;

#[derive(Error, Debug)]
pub enum AuthExchangeError {
    #[error("authorization code prompt failed")]
    Prompt,
    #[error("authorization code exchange failed")]
    Exchange,
    #[error("token refresh failed")]
    Refresh,
    #[error("could not read cached credential")]
    CacheRead,
    #[error("could not write cached credential")]
    CacheWrite,
}

/// Produces a usable delegated-authorization credential, reusing a cached one
/// when present and running the interactive consent exchange otherwise.
pub struct CredentialBroker<P, X> {
    cache_path: PathBuf,
    refresh_expired: bool,
    prompt: P,
    exchanger: X,
}

impl<P, X> CredentialBroker<P, X>
where
    P: AuthorizationCodePrompt,
    X: TokenExchanger,
{
    pub fn new(cache_path: impl Into<PathBuf>, prompt: P, exchanger: X) -> Self {
        CredentialBroker {
            cache_path: cache_path.into(),
            refresh_expired: false,
            prompt,
            exchanger,
        }
    }

    /// Opt into refreshing an expired cached credential before use. Off by
    /// default: a stale token is reused as-is and fails at the query step.
    pub fn refresh_expired(mut self, enabled: bool) -> Self {
        self.refresh_expired = enabled;
        self
    }

    pub async fn acquire(
        &self,
        registration: &ClientRegistration,
    ) -> Result<AuthorizationCredential, AuthExchangeError> {
        if self.cache_path.exists() {
            debug!(path = %self.cache_path.display(), "reusing cached credential");
            let credential = self.read_cache()?;

            if self.refresh_expired && credential.is_expired(Utc::now()) {
                if let Some(refresh_token) = credential.refresh_token.as_deref() {
                    let refreshed = self.exchanger.refresh(registration, refresh_token).await?;
                    self.write_cache(&refreshed)?;
                    return Ok(refreshed);
                }
            }

            return Ok(credential);
        }

        let auth_url = registration.authorization_url();
        let code = self.prompt.request_code(&auth_url).await?;
        let credential = self
            .exchanger
            .exchange_code(registration, code.trim())
            .await?;

        self.write_cache(&credential)?;
        info!(path = %self.cache_path.display(), "token stored");

        Ok(credential)
    }

    fn read_cache(&self) -> Result<AuthorizationCredential, AuthExchangeError> {
        let raw = std::fs::read_to_string(&self.cache_path)
            .change_context(AuthExchangeError::CacheRead)?;
        serde_json::from_str(&raw).change_context(AuthExchangeError::CacheRead)
    }

    fn write_cache(&self, credential: &AuthorizationCredential) -> Result<(), AuthExchangeError> {
        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).change_context(AuthExchangeError::CacheWrite)?;
            }
        }
        let raw =
            serde_json::to_string(credential).change_context(AuthExchangeError::CacheWrite)?;
        std::fs::write(&self.cache_path, raw).change_context(AuthExchangeError::CacheWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registration() -> ClientRegistration {
        ClientRegistration {
            client_id: "id-123".to_owned(),
            client_secret: "secret-456".to_owned(),
            redirect_uris: vec!["urn:ietf:wg:oauth:2.0:oob".to_owned()],
        }
    }

    fn credential(access_token: &str) -> AuthorizationCredential {
        AuthorizationCredential {
            access_token: access_token.to_owned(),
            refresh_token: Some("refresh-def".to_owned()),
            scope: None,
            token_type: "Bearer".to_owned(),
            expiry: None,
        }
    }

    struct CountingPrompt {
        calls: AtomicUsize,
    }

    impl CountingPrompt {
        fn new() -> Self {
            CountingPrompt {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AuthorizationCodePrompt for CountingPrompt {
        async fn request_code(&self, auth_url: &str) -> Result<String, AuthExchangeError> {
            assert!(auth_url.contains("client_id=id-123"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Trailing newline mimics a pasted console line.
            Ok("one-time-code\n".to_owned())
        }
    }

    struct CountingExchanger {
        exchanges: AtomicUsize,
        refreshes: AtomicUsize,
    }

    impl CountingExchanger {
        fn new() -> Self {
            CountingExchanger {
                exchanges: AtomicUsize::new(0),
                refreshes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenExchanger for CountingExchanger {
        async fn exchange_code(
            &self,
            _registration: &ClientRegistration,
            code: &str,
        ) -> Result<AuthorizationCredential, AuthExchangeError> {
            assert_eq!(code, "one-time-code", "code should be trimmed");
            self.exchanges.fetch_add(1, Ordering::SeqCst);
            Ok(credential("exchanged-token"))
        }

        async fn refresh(
            &self,
            _registration: &ClientRegistration,
            _refresh_token: &str,
        ) -> Result<AuthorizationCredential, AuthExchangeError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(credential("refreshed-token"))
        }
    }

    #[tokio::test]
    async fn test_first_run_prompts_exchanges_and_caches_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("accessToken.json");
        let broker = CredentialBroker::new(
            cache_path.clone(),
            CountingPrompt::new(),
            CountingExchanger::new(),
        );

        let acquired = broker.acquire(&registration()).await.unwrap();

        assert_eq!(acquired.access_token, "exchanged-token");
        assert_eq!(broker.prompt.calls.load(Ordering::SeqCst), 1);
        assert_eq!(broker.exchanger.exchanges.load(Ordering::SeqCst), 1);
        assert!(cache_path.exists(), "credential should be cached");

        let cached: AuthorizationCredential =
            serde_json::from_str(&std::fs::read_to_string(&cache_path).unwrap()).unwrap();
        assert_eq!(cached, acquired);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_prompt_and_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("accessToken.json");
        std::fs::write(
            &cache_path,
            serde_json::to_string(&credential("cached-token")).unwrap(),
        )
        .unwrap();

        let broker = CredentialBroker::new(
            cache_path,
            CountingPrompt::new(),
            CountingExchanger::new(),
        );

        let acquired = broker.acquire(&registration()).await.unwrap();

        assert_eq!(acquired.access_token, "cached-token");
        assert_eq!(broker.prompt.calls.load(Ordering::SeqCst), 0);
        assert_eq!(broker.exchanger.exchanges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_cache_reused_as_is_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("accessToken.json");
        let expired = AuthorizationCredential {
            expiry: Some(Utc::now() - chrono::Duration::hours(1)),
            ..credential("expired-token")
        };
        std::fs::write(&cache_path, serde_json::to_string(&expired).unwrap()).unwrap();

        let broker = CredentialBroker::new(
            cache_path,
            CountingPrompt::new(),
            CountingExchanger::new(),
        );

        let acquired = broker.acquire(&registration()).await.unwrap();

        // Downstream query failure is the contract here, not a refresh.
        assert_eq!(acquired.access_token, "expired-token");
        assert_eq!(broker.exchanger.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_cache_refreshed_when_opted_in() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("accessToken.json");
        let expired = AuthorizationCredential {
            expiry: Some(Utc::now() - chrono::Duration::hours(1)),
            ..credential("expired-token")
        };
        std::fs::write(&cache_path, serde_json::to_string(&expired).unwrap()).unwrap();

        let broker = CredentialBroker::new(
            cache_path.clone(),
            CountingPrompt::new(),
            CountingExchanger::new(),
        )
        .refresh_expired(true);

        let acquired = broker.acquire(&registration()).await.unwrap();

        assert_eq!(acquired.access_token, "refreshed-token");
        assert_eq!(broker.prompt.calls.load(Ordering::SeqCst), 0);
        assert_eq!(broker.exchanger.refreshes.load(Ordering::SeqCst), 1);

        let cached: AuthorizationCredential =
            serde_json::from_str(&std::fs::read_to_string(&cache_path).unwrap()).unwrap();
        assert_eq!(cached.access_token, "refreshed-token");
    }

    #[tokio::test]
    async fn test_cache_written_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("state/tokens/accessToken.json");

        let broker = CredentialBroker::new(
            cache_path.clone(),
            CountingPrompt::new(),
            CountingExchanger::new(),
        );

        broker.acquire(&registration()).await.unwrap();
        assert!(cache_path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("accessToken.json");
        std::fs::write(&cache_path, "not json").unwrap();

        let broker = CredentialBroker::new(
            cache_path,
            CountingPrompt::new(),
            CountingExchanger::new(),
        );

        assert!(broker.acquire(&registration()).await.is_err());
    }
}
