//! Access tokens issued by the identity platform.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Bearer token used against the mail API.
///
/// A refresh produces a new value; tokens are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque access token.
    pub access_token: String,
    /// Authorization scheme, `Bearer` in practice.
    pub token_type: String,
    /// When the access token stops being accepted, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Long-lived token for the refresh-token grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scopes the user actually consented to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl Token {
    /// Bearer token with no expiry or refresh token, e.g. one issued elsewhere.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".into(),
            expires_at: None,
            refresh_token: None,
            scopes: Vec::new(),
        }
    }

    /// Builds a token from a token endpoint answer received at `issued_at`.
    pub(crate) fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Result<Self> {
        if response.access_token.is_empty() {
            return Err(Error::InvalidResponse("empty access_token".into()));
        }

        let expires_at = response
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| issued_at + Duration::seconds(secs));

        Ok(Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            scopes: response
                .scope
                .split_whitespace()
                .map(ToString::to_string)
                .collect(),
        })
    }

    /// True once the token is within a minute of its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= at)
    }

    /// Inverse of [`is_expired`](Self::is_expired).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    /// Whether `scope` was granted. Tokens without scope information grant nothing.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s.eq_ignore_ascii_case(scope))
    }

    /// Value for an `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Attaches a refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the expiry.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// The refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] if none was issued.
    pub fn refresh_token(&self) -> Result<&str> {
        self.refresh_token.as_deref().ok_or(Error::NoRefreshToken)
    }
}

/// Successful token endpoint body.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

fn bearer_type() -> String {
    "Bearer".into()
}

/// Failed token endpoint body.
///
/// Azure AD adds numeric `error_codes` (e.g. `70008` for an expired code).
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub error_codes: Vec<u32>,
}

impl From<ErrorResponse> for Error {
    fn from(response: ErrorResponse) -> Self {
        let description = match response.error_codes.as_slice() {
            [] => response.error_description,
            codes => format!("{} (codes {codes:?})", response.error_description),
        };
        Self::oauth_error(response.error, description)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        let token = Token::bearer("eyJ0eXAi");
        assert_eq!(token.authorization(), "Bearer eyJ0eXAi");
        assert!(token.expires_at.is_none());
        assert!(token.is_valid());
        assert!(!token.has_scope("Mail.ReadWrite"));
    }

    #[test]
    fn test_expiry_margin() {
        let past = Token::bearer("a").with_expires_at(Utc::now() - Duration::seconds(120));
        assert!(past.is_expired());

        let nearly = Token::bearer("a").with_expires_at(Utc::now() + Duration::seconds(30));
        assert!(nearly.is_expired());

        let fresh = Token::bearer("a").with_expires_at(Utc::now() + Duration::hours(1));
        assert!(fresh.is_valid());
    }

    #[test]
    fn test_token_from_graph_response() {
        let body = r#"{
            "token_type": "Bearer",
            "scope": "User.Read Mail.Read Mail.Send Mail.ReadWrite",
            "expires_in": 3599,
            "ext_expires_in": 3599,
            "access_token": "eyJ0eXAi",
            "refresh_token": "AwABAAAA"
        }"#;
        let issued_at = Utc::now();
        let token = Token::from_response(serde_json::from_str(body).unwrap(), issued_at).unwrap();

        assert_eq!(token.expires_at, Some(issued_at + Duration::seconds(3599)));
        assert_eq!(token.refresh_token().unwrap(), "AwABAAAA");
        assert!(token.has_scope("mail.readwrite"));
        assert_eq!(token.scopes.len(), 4);
    }

    #[test]
    fn test_token_response_defaults() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token":"x"}"#).unwrap();
        let token = Token::from_response(response, Utc::now()).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert!(token.expires_at.is_none());
        assert!(matches!(token.refresh_token(), Err(Error::NoRefreshToken)));
    }

    #[test]
    fn test_empty_access_token_is_rejected() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token":""}"#).unwrap();
        assert!(matches!(
            Token::from_response(response, Utc::now()),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_error_response_keeps_codes() {
        let response: ErrorResponse = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"AADSTS70008: expired","error_codes":[70008]}"#,
        )
        .unwrap();
        let err = Error::from(response);
        assert_eq!(
            err.to_string(),
            "OAuth2 error: invalid_grant - AADSTS70008: expired (codes [70008])"
        );
    }
}
