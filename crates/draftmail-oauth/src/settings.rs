//! Application registration settings read from the environment.

use crate::error::{Error, Result};
use crate::flow::{AuthorizationCodeFlow, OAuthClient};
use crate::provider::Provider;

/// Environment variable holding the application (client) ID.
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
/// Environment variable holding the directory (tenant) ID.
pub const TENANT_ID_VAR: &str = "TENANT_ID";
/// Environment variable holding the registered redirect URI.
pub const REDIRECT_URI_VAR: &str = "REDIRECT_URI";
/// Optional environment variable holding a confidential client secret.
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";

/// App registration details needed for the authorization code flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Application (client) ID.
    pub client_id: String,
    /// Directory (tenant) ID.
    pub tenant_id: String,
    /// Redirect URI registered for the application.
    pub redirect_uri: String,
    /// Client secret for confidential clients.
    pub client_secret: Option<String>,
}

impl AuthSettings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::InvalidConfig(format!("{key} is not set")))
        };

        Ok(Self {
            client_id: required(CLIENT_ID_VAR)?,
            tenant_id: required(TENANT_ID_VAR)?,
            redirect_uri: required(REDIRECT_URI_VAR)?,
            client_secret: lookup(CLIENT_SECRET_VAR).filter(|value| !value.is_empty()),
        })
    }

    /// Builds the OAuth client for these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant produces an invalid endpoint URL.
    pub fn oauth_client(&self) -> Result<OAuthClient> {
        let provider = Provider::microsoft(&self.tenant_id)?;
        let mut client =
            OAuthClient::new(&self.client_id, provider).with_redirect_uri(&self.redirect_uri);
        if let Some(secret) = &self.client_secret {
            client = client.with_client_secret(secret);
        }
        Ok(client)
    }

    /// Builds the authorization code flow for these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant produces an invalid endpoint URL.
    pub fn authorization_code_flow(&self) -> Result<AuthorizationCodeFlow> {
        Ok(AuthorizationCodeFlow::new(self.oauth_client()?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let settings = AuthSettings::from_lookup(lookup(&[
            ("CLIENT_ID", "client-1"),
            ("TENANT_ID", "tenant-1"),
            ("REDIRECT_URI", "https://app.example.com/cb"),
        ]))
        .unwrap();

        assert_eq!(settings.client_id, "client-1");
        assert_eq!(settings.tenant_id, "tenant-1");
        assert_eq!(settings.redirect_uri, "https://app.example.com/cb");
        assert!(settings.client_secret.is_none());
    }

    #[test]
    fn test_missing_variable() {
        let err = AuthSettings::from_lookup(lookup(&[
            ("CLIENT_ID", "client-1"),
            ("REDIRECT_URI", "https://app.example.com/cb"),
        ]))
        .unwrap_err();

        assert_eq!(err.to_string(), "Invalid configuration: TENANT_ID is not set");
    }

    #[test]
    fn test_blank_variable_is_missing() {
        let result = AuthSettings::from_lookup(lookup(&[
            ("CLIENT_ID", "  "),
            ("TENANT_ID", "tenant-1"),
            ("REDIRECT_URI", "https://app.example.com/cb"),
        ]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_flow_from_settings() {
        let settings = AuthSettings::from_lookup(lookup(&[
            ("CLIENT_ID", "client-1"),
            ("TENANT_ID", "tenant-1"),
            ("REDIRECT_URI", "https://app.example.com/cb"),
            ("CLIENT_SECRET", "s3cret"),
        ]))
        .unwrap();

        let flow = settings.authorization_code_flow().unwrap();
        assert_eq!(flow.client().client_secret.as_deref(), Some("s3cret"));
        assert_eq!(
            flow.client().redirect_uri.as_deref(),
            Some("https://app.example.com/cb")
        );
    }
}
