//! Errors raised while obtaining tokens.

/// Result type alias for token operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Token acquisition error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The token endpoint could not be reached.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with something other than the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider rejected the grant.
    #[error("OAuth2 error: {error} - {description}")]
    OAuth {
        /// Error code such as `invalid_grant`.
        error: String,
        /// Provider's explanation, e.g. `AADSTS70008: ...`.
        description: String,
    },

    /// A held token is past its expiry and cannot be renewed from here.
    #[error("Token expired")]
    TokenExpired,

    /// Renewal was needed but no refresh token was issued.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The authorization code was already redeemed and no refreshable token is cached.
    #[error("Authorization code already redeemed; the user must sign in again")]
    CodeRedeemed,

    /// A successful answer that carries no usable token.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Missing or malformed app registration settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Endpoint URL does not parse.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Rejection reported by the provider.
    #[must_use]
    pub fn oauth_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }

    /// True if the only way forward is a new login link.
    ///
    /// Transport failures and bad configuration are not included.
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::OAuth { .. } | Self::TokenExpired | Self::NoRefreshToken | Self::CodeRedeemed
        )
    }
}
