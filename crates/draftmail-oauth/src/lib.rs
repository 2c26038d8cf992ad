//! # draftmail-oauth
//!
//! Signs a user in to Microsoft 365 with the authorization code grant and
//! hands bearer tokens to the mail client.
//!
//! A web application sends the user to the link from
//! [`AuthorizationCodeFlow::authorization_url`]; the redirect brings back a
//! one-time `code`. [`AuthorizationCodeCredential`] redeems it, caches the
//! token, and renews it with the refresh token once it nears expiry. Callers
//! that already hold a token wrap it in [`StaticToken`].
//!
//! App registration details come from the environment through
//! [`AuthSettings::from_env`].
//!
//! ```ignore
//! use draftmail_oauth::{AuthSettings, AuthorizationCodeCredential, TokenSource};
//!
//! let settings = AuthSettings::from_env()?;
//! let flow = settings.authorization_code_flow()?;
//! println!("Sign in at {}", flow.authorization_url(None, Some("policy-42")));
//!
//! let credential = AuthorizationCodeCredential::new(flow, code_from_redirect);
//! let token = credential.token(&[]).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod settings;
pub mod source;
pub mod token;

pub use error::{Error, Result};
pub use flow::{
    AuthorizationCodeFlow, DEFAULT_TOKEN_TIMEOUT, LOGIN_LINK_KEY, OAuthClient, OFFLINE_ACCESS,
};
pub use provider::{MAIL_SCOPES, Provider};
pub use settings::AuthSettings;
pub use source::{AuthorizationCodeCredential, StaticToken, TokenSource};
pub use token::Token;
