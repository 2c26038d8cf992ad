//! Identity platform endpoints.

use crate::error::{Error, Result};
use url::Url;

/// Delegated Graph scopes needed to read, draft and send mail.
pub const MAIL_SCOPES: [&str; 4] = ["User.Read", "Mail.Read", "Mail.Send", "Mail.ReadWrite"];

/// Global Azure AD authority.
pub const MICROSOFT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Authorization and token endpoints of an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    /// Display name used in logs.
    pub name: String,
    /// Where the user is sent to sign in.
    pub auth_url: Url,
    /// Where codes and refresh tokens are redeemed.
    pub token_url: Url,
    /// Scopes requested when the caller names none.
    pub default_scopes: Vec<String>,
}

impl Provider {
    /// Microsoft identity platform for `tenant` on the global authority.
    ///
    /// The tenant may be a directory GUID, a verified domain, or one of the
    /// multi-tenant aliases (`common`, `organizations`, `consumers`). Defaults
    /// to [`MAIL_SCOPES`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the tenant is blank or not a single
    /// path segment.
    pub fn microsoft(tenant: &str) -> Result<Self> {
        Self::microsoft_at(MICROSOFT_AUTHORITY, tenant)
    }

    /// Microsoft identity platform on another authority, such as a national
    /// cloud (`https://login.microsoftonline.us`).
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant is unusable or the authority is not an
    /// HTTP(S) URL.
    pub fn microsoft_at(authority: &str, tenant: &str) -> Result<Self> {
        let tenant = tenant.trim();
        if tenant.is_empty() {
            return Err(Error::InvalidConfig("tenant is empty".into()));
        }
        if tenant.contains(['/', '?', '#']) || tenant.contains(char::is_whitespace) {
            return Err(Error::InvalidConfig(format!("tenant {tenant:?} is not a path segment")));
        }

        let base = format!("{}/{tenant}/oauth2/v2.0", authority.trim_end_matches('/'));
        Ok(Self::custom(
            "Microsoft",
            &format!("{base}/authorize"),
            &format!("{base}/token"),
        )?
        .with_default_scopes(MAIL_SCOPES))
    }

    /// Any provider speaking the authorization code grant.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint does not parse or is not HTTP(S).
    pub fn custom(name: impl Into<String>, auth_url: &str, token_url: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            auth_url: endpoint(auth_url)?,
            token_url: endpoint(token_url)?,
            default_scopes: Vec::new(),
        })
    }

    /// Replaces the default scopes.
    #[must_use]
    pub fn with_default_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

fn endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        other => Err(Error::InvalidConfig(format!(
            "endpoint {raw} uses unsupported scheme {other}"
        ))),
    }
}
