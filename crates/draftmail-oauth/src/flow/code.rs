//! Login links and code redemption.

use std::collections::HashMap;

use url::Url;

use super::OAuthClient;
use crate::error::Result;
use crate::token::Token;

/// Template context key under which [`AuthorizationCodeFlow::login_context`] stores the link.
pub const LOGIN_LINK_KEY: &str = "ms_auth_link";

/// Authorization code grant for a web application.
///
/// The user follows [`authorization_url`](Self::authorization_url), signs in,
/// and is redirected back with `code` and `state` in the query string. The
/// code is then redeemed once with [`exchange_code`](Self::exchange_code).
#[derive(Debug, Clone)]
pub struct AuthorizationCodeFlow {
    client: OAuthClient,
}

impl AuthorizationCodeFlow {
    /// Wraps `client`.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client }
    }

    /// The registered application behind this flow.
    #[must_use]
    pub const fn client(&self) -> &OAuthClient {
        &self.client
    }

    /// Sign-in link.
    ///
    /// Parameters appear in the order `client_id`, `response_type`,
    /// `redirect_uri`, `response_mode`, `scope`, `state`; absent ones are
    /// skipped. `state` usually identifies the record the login is for and is
    /// echoed back unchanged on the redirect.
    #[must_use]
    pub fn authorization_url(&self, scopes: Option<&[String]>, state: Option<&str>) -> Url {
        let client = &self.client;
        let scope = client.scope_string(scopes);
        let params = [
            ("client_id", Some(client.client_id.as_str())),
            ("response_type", Some("code")),
            ("redirect_uri", client.redirect_uri.as_deref()),
            ("response_mode", Some("query")),
            ("scope", Some(scope.as_str()).filter(|s| !s.is_empty())),
            ("state", state),
        ];

        let mut url = client.provider.auth_url.clone();
        url.query_pairs_mut()
            .extend_pairs(params.iter().filter_map(|(key, value)| value.map(|v| (key, v))));
        url
    }

    /// Login link with default scopes, keyed by [`LOGIN_LINK_KEY`] for a page template.
    #[must_use]
    pub fn login_context(&self, state: &str) -> HashMap<String, String> {
        let link = self.authorization_url(None, Some(state));
        HashMap::from([(LOGIN_LINK_KEY.to_string(), link.into())])
    }

    /// Redeems the code from the redirect. A code can be redeemed only once.
    ///
    /// # Errors
    ///
    /// Returns the provider's rejection, e.g. `invalid_grant` for a used or
    /// expired code.
    pub async fn exchange_code(&self, code: &str, scopes: Option<&[String]>) -> Result<Token> {
        self.client.exchange_code(code, scopes).await
    }

    /// Obtains a fresh token from a previously issued one.
    ///
    /// # Errors
    ///
    /// Returns an error if the token carries no refresh token or the grant fails.
    pub async fn refresh(&self, token: &Token, scopes: Option<&[String]>) -> Result<Token> {
        self.client.refresh_token(token, scopes).await
    }
}
