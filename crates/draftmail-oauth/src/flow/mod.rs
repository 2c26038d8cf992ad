//! Token endpoint client.

mod code;

pub use code::{AuthorizationCodeFlow, LOGIN_LINK_KEY};

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tracing::debug;

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::token::{ErrorResponse, Token};

/// How long a token endpoint request may take by default.
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

/// Scope that makes the token endpoint issue a refresh token.
pub const OFFLINE_ACCESS: &str = "offline_access";

/// What is redeemed at the token endpoint.
#[derive(Debug, Clone, Copy)]
enum Grant<'a> {
    AuthorizationCode {
        code: &'a str,
        redirect_uri: Option<&'a str>,
    },
    RefreshToken(&'a str),
}

impl Grant<'_> {
    const fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken(_) => "refresh_token",
        }
    }
}

/// Registered application talking to a provider's token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// Application (client) ID.
    pub client_id: String,
    /// Secret of a confidential client; public clients have none.
    pub client_secret: Option<String>,
    /// Redirect URI registered for the application.
    pub redirect_uri: Option<String>,
    /// Endpoints and default scopes.
    pub provider: Provider,
    /// Bound on each token endpoint request.
    pub timeout: Duration,
    http_client: Client,
}

impl OAuthClient {
    /// Creates a public client with no redirect URI.
    #[must_use]
    pub fn new(client_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            provider,
            timeout: DEFAULT_TOKEN_TIMEOUT,
            http_client: Client::new(),
        }
    }

    /// Makes this a confidential client.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the redirect URI sent with login links and code redemption.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Sets the bound on each token endpoint request.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the HTTP client used against the token endpoint.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Space-separated scopes, falling back to the provider defaults.
    pub(crate) fn scope_string(&self, scopes: Option<&[String]>) -> String {
        match scopes {
            Some(s) if !s.is_empty() => s.join(" "),
            _ => self.provider.default_scopes.join(" "),
        }
    }

    /// Scopes sent to the token endpoint: the requested ones plus
    /// [`OFFLINE_ACCESS`], so that a refresh token comes back.
    fn token_scope(&self, scopes: Option<&[String]>) -> String {
        let scope = self.scope_string(scopes);
        if scope
            .split_whitespace()
            .any(|s| s.eq_ignore_ascii_case(OFFLINE_ACCESS))
        {
            scope
        } else if scope.is_empty() {
            OFFLINE_ACCESS.to_string()
        } else {
            format!("{scope} {OFFLINE_ACCESS}")
        }
    }

    /// Redeems the refresh token carried by `token`.
    ///
    /// The previous refresh token is kept when the provider does not rotate it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] if `token` has none, or the
    /// provider's rejection.
    pub async fn refresh_token(&self, token: &Token, scopes: Option<&[String]>) -> Result<Token> {
        let grant = Grant::RefreshToken(token.refresh_token()?);
        let mut fresh = self.redeem(grant, scopes).await?;
        if fresh.refresh_token.is_none() {
            fresh.refresh_token.clone_from(&token.refresh_token);
        }
        Ok(fresh)
    }

    pub(crate) async fn exchange_code(&self, code: &str, scopes: Option<&[String]>) -> Result<Token> {
        let grant = Grant::AuthorizationCode {
            code,
            redirect_uri: self.redirect_uri.as_deref(),
        };
        self.redeem(grant, scopes).await
    }

    fn form(&self, grant: Grant<'_>, scopes: Option<&[String]>) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("grant_type", grant.grant_type().to_string()),
            ("client_id", self.client_id.clone()),
        ];
        match grant {
            Grant::AuthorizationCode { code, redirect_uri } => {
                form.push(("code", code.to_string()));
                if let Some(uri) = redirect_uri {
                    form.push(("redirect_uri", uri.to_string()));
                }
            }
            Grant::RefreshToken(refresh_token) => {
                form.push(("refresh_token", refresh_token.to_string()));
            }
        }

        form.push(("scope", self.token_scope(scopes)));
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.clone()));
        }
        form
    }

    async fn redeem(&self, grant: Grant<'_>, scopes: Option<&[String]>) -> Result<Token> {
        let form = self.form(grant, scopes);
        debug!(provider = %self.provider.name, grant = grant.grant_type(), "Requesting token");

        let response = self
            .http_client
            .post(self.provider.token_url.clone())
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(endpoint_error(status.as_u16(), &body));
        }
        Token::from_response(serde_json::from_slice(&body)?, Utc::now())
    }
}

/// Turns a failed token endpoint answer into an error, even when it is not JSON.
fn endpoint_error(status: u16, body: &[u8]) -> Error {
    serde_json::from_slice::<ErrorResponse>(body).map_or_else(
        |_| Error::oauth_error(format!("http_{status}"), String::from_utf8_lossy(body)),
        Error::from,
    )
}
