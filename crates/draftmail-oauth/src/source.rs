//! Token sources the mail client pulls bearer tokens from.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flow::AuthorizationCodeFlow;
use crate::token::Token;

/// Something that can hand out a bearer token for a set of scopes.
///
/// Implementations may cache and refresh internally; callers treat every
/// returned [`Token`] as an immutable snapshot.
pub trait TokenSource: Send + Sync {
    /// Returns a token valid for `scopes`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token can be produced without user interaction.
    fn token(&self, scopes: &[String]) -> impl Future<Output = Result<Token>> + Send;
}

/// A token obtained elsewhere, handed out until it expires.
#[derive(Debug, Clone)]
pub struct StaticToken(pub Token);

impl TokenSource for StaticToken {
    async fn token(&self, _scopes: &[String]) -> Result<Token> {
        if self.0.is_expired() {
            return Err(Error::TokenExpired);
        }
        Ok(self.0.clone())
    }
}

#[derive(Debug)]
struct CredentialState {
    code: Option<String>,
    token: Option<Token>,
}

/// Redeems an authorization code once, then serves and refreshes the result.
#[derive(Debug)]
pub struct AuthorizationCodeCredential {
    flow: AuthorizationCodeFlow,
    state: Mutex<CredentialState>,
}

impl AuthorizationCodeCredential {
    /// Creates a credential that will redeem `code` on first use.
    #[must_use]
    pub fn new(flow: AuthorizationCodeFlow, code: impl Into<String>) -> Self {
        Self {
            flow,
            state: Mutex::new(CredentialState {
                code: Some(code.into()),
                token: None,
            }),
        }
    }

    /// Creates a credential around a token from an earlier redemption.
    #[must_use]
    pub fn from_token(flow: AuthorizationCodeFlow, token: Token) -> Self {
        Self {
            flow,
            state: Mutex::new(CredentialState {
                code: None,
                token: Some(token),
            }),
        }
    }

    /// Returns the currently cached token, if any.
    pub async fn cached(&self) -> Option<Token> {
        self.state.lock().await.token.clone()
    }
}

impl TokenSource for AuthorizationCodeCredential {
    async fn token(&self, scopes: &[String]) -> Result<Token> {
        let mut state = self.state.lock().await;

        if let Some(token) = &state.token {
            if token.is_valid() {
                return Ok(token.clone());
            }
            if token.refresh_token.is_some() {
                debug!("Cached token expired, using refresh token");
                let fresh = self.flow.refresh(token, Some(scopes)).await?;
                state.token = Some(fresh.clone());
                return Ok(fresh);
            }
        }

        // Codes are single use; a failed redemption still consumes it
        let code = state.code.take().ok_or(Error::CodeRedeemed)?;
        let token = self.flow.exchange_code(&code, Some(scopes)).await?;
        info!(expires_at = ?token.expires_at, "Authorization code redeemed");
        state.token = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::flow::OAuthClient;
    use crate::provider::Provider;
    use chrono::{Duration, Utc};

    fn flow() -> AuthorizationCodeFlow {
        let provider = Provider::microsoft("common").unwrap();
        AuthorizationCodeFlow::new(OAuthClient::new("client", provider))
    }

    fn scopes() -> Vec<String> {
        vec!["Mail.ReadWrite".to_string()]
    }

    #[test]
    fn test_static_token_valid() {
        let source = StaticToken(Token::bearer("abc"));
        let token = tokio_test::block_on(source.token(&scopes())).unwrap();
        assert_eq!(token.access_token, "abc");
    }

    #[tokio::test]
    async fn test_static_token_expired() {
        let expired = Token::bearer("abc").with_expires_at(Utc::now() - Duration::minutes(5));
        let source = StaticToken(expired);
        assert!(matches!(
            source.token(&scopes()).await,
            Err(Error::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_credential_serves_cached_token() {
        let cached = Token::bearer("cached").with_expires_at(Utc::now() + Duration::hours(1));
        let credential = AuthorizationCodeCredential::from_token(flow(), cached);

        let token = credential.token(&scopes()).await.unwrap();
        assert_eq!(token.access_token, "cached");
        assert_eq!(credential.cached().await.unwrap().access_token, "cached");
    }

    #[tokio::test]
    async fn test_credential_without_code_or_refresh_token() {
        let expired = Token::bearer("old").with_expires_at(Utc::now() - Duration::hours(1));
        let credential = AuthorizationCodeCredential::from_token(flow(), expired);

        let err = credential.token(&scopes()).await.unwrap_err();
        assert!(matches!(err, Error::CodeRedeemed));
        assert!(err.requires_reauthentication());
    }
}
