use std::io::Write;

use async_trait::async_trait;
use error_stack::{Result, ResultExt};

use super::broker::AuthExchangeError;

/// Capability for obtaining the one-time authorization code from the
/// operator. Injected into the broker so the interactive wait can be replaced
/// in tests; the production implementation suspends indefinitely until a line
/// arrives.
#[async_trait]
pub trait AuthorizationCodePrompt: Send + Sync {
    async fn request_code(&self, auth_url: &str) -> Result<String, AuthExchangeError>;
}

/// Console prompt: prints the consent URL and reads the pasted code from
/// standard input.
pub struct StdinPrompt;

#[async_trait]
impl AuthorizationCodePrompt for StdinPrompt {
    async fn request_code(&self, auth_url: &str) -> Result<String, AuthExchangeError> {
        println!("Open this URL in your browser to authorize access:");
        println!("{auth_url}");
        print!("Paste the authorization code here: ");
        std::io::stdout()
            .flush()
            .change_context(AuthExchangeError::Prompt)?;

        // stdin has no async reader worth pulling in for a single line; move
        // the blocking read off the runtime instead.
        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await
        .change_context(AuthExchangeError::Prompt)?
        .change_context(AuthExchangeError::Prompt)?;

        Ok(line.trim().to_owned())
    }
}
