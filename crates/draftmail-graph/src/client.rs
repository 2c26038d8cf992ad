//! Authenticated mail client.

use std::path::Path;

use bytes::Bytes;
use draftmail_oauth::{Token, TokenSource};
use tracing::{debug, info, warn};
use url::Url;

use crate::attachment::{AttachmentPayload, AttachmentResult, AttachmentUploader, PayloadOrigin};
use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::message::{Draft, DraftComposer, DraftMessage};
use crate::transport::{ApiRequest, ReqwestTransport, Transport};

/// Where the client stands in the token lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token has been requested yet.
    Unauthenticated,
    /// A valid token is held.
    TokenAcquired,
    /// Acquisition failed or the token expired; the user must sign in again.
    ReAuthenticationRequired,
}

/// Creates drafts and attaches files with a token from `S`.
///
/// The token is fetched on [`connect`](Self::connect) and replaced only by
/// [`refresh_token`](Self::refresh_token). Operations borrow the client
/// immutably, so independent drafts and attachments may run concurrently.
#[derive(Debug)]
pub struct MailClient<S, T = ReqwestTransport> {
    source: S,
    transport: T,
    config: GraphConfig,
    token: Option<Token>,
    acquisition_failed: bool,
}

impl<S: TokenSource> MailClient<S, ReqwestTransport> {
    /// Connects over HTTP using `config.request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built. Token failures are not errors here.
    pub async fn connect_http(source: S, config: GraphConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Self::connect(source, transport, config).await
    }
}

impl<S: TokenSource, T: Transport> MailClient<S, T> {
    /// Creates a client without requesting a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(source: S, transport: T, config: GraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            transport,
            config,
            token: None,
            acquisition_failed: false,
        })
    }

    /// Creates a client and requests the initial token.
    ///
    /// A failed token request is logged and leaves the client in
    /// [`AuthState::ReAuthenticationRequired`]; operations then fail with
    /// [`Error::Authentication`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the configuration is invalid.
    pub async fn connect(source: S, transport: T, config: GraphConfig) -> Result<Self> {
        let mut client = Self::new(source, transport, config)?;
        if let Err(e) = client.refresh_token().await {
            warn!(error = %e, "Authentication failed; the user may need to sign in again");
        }
        Ok(client)
    }

    /// Requests a new token and replaces the current one.
    ///
    /// On failure the current token is dropped.
    ///
    /// # Errors
    ///
    /// Returns the token source's error.
    pub async fn refresh_token(&mut self) -> Result<&Token> {
        match self.source.token(&self.config.scopes).await {
            Ok(token) => {
                debug!(expires_at = ?token.expires_at, "Access token acquired");
                self.acquisition_failed = false;
                Ok(self.token.insert(token))
            }
            Err(e) => {
                self.token = None;
                self.acquisition_failed = true;
                Err(e.into())
            }
        }
    }

    /// Current position in the token lifecycle.
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        match &self.token {
            Some(token) if token.is_valid() => AuthState::TokenAcquired,
            Some(_) => AuthState::ReAuthenticationRequired,
            None if self.acquisition_failed => AuthState::ReAuthenticationRequired,
            None => AuthState::Unauthenticated,
        }
    }

    /// Token currently held, valid or not.
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn bearer(&self) -> Result<&Token> {
        match &self.token {
            Some(token) if token.is_valid() => Ok(token),
            Some(_) => Err(Error::Authentication(
                "access token expired; sign in again".into(),
            )),
            None => Err(Error::Authentication(
                "no access token; sign in again".into(),
            )),
        }
    }

    /// Creates a draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] without sending anything if no valid
    /// token is held, and [`Error::RemoteRequest`] if the server rejects it.
    pub async fn send_draft_email(&self, draft: &Draft) -> Result<DraftMessage> {
        let token = self.bearer()?;
        DraftComposer::new(&self.transport, &self.config)
            .create_draft(draft, token)
            .await
    }

    /// Attaches a prepared payload to the draft `message_id`.
    ///
    /// # Errors
    ///
    /// See [`AttachmentUploader::upload`]; fails with
    /// [`Error::Authentication`] first if no valid token is held.
    pub async fn upload(
        &self,
        message_id: &str,
        payload: AttachmentPayload,
    ) -> Result<AttachmentResult> {
        let token = self.bearer()?;
        AttachmentUploader::new(&self.transport, &self.config)
            .upload(message_id, payload, token)
            .await
    }

    /// Attaches in-memory bytes. Any path prefix of `name` is dropped.
    ///
    /// # Errors
    ///
    /// See [`upload`](Self::upload).
    pub async fn attach_bytes(
        &self,
        message_id: &str,
        bytes: impl Into<Bytes>,
        name: &str,
    ) -> Result<AttachmentResult> {
        self.upload(message_id, AttachmentPayload::new(name, bytes))
            .await
    }

    /// Reads a whole local file and attaches it as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceRead`] if the file cannot be read, otherwise see
    /// [`upload`](Self::upload).
    pub async fn attach_local_file(
        &self,
        message_id: &str,
        path: impl AsRef<Path>,
        name: &str,
    ) -> Result<AttachmentResult> {
        self.bearer()?;
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::SourceRead {
                location: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), size = bytes.len(), "Read local attachment");
        let payload = AttachmentPayload::new(name, bytes)
            .with_origin(PayloadOrigin::Local(path.to_path_buf()));
        self.upload(message_id, payload).await
    }

    /// Downloads `url` and attaches the body as `name`.
    ///
    /// The download carries no credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceRead`] if the URL does not parse, the download
    /// fails, or it answers with a non-success status, otherwise see [`upload`](Self::upload).
    pub async fn attach_remote_file(
        &self,
        message_id: &str,
        url: &str,
        name: &str,
    ) -> Result<AttachmentResult> {
        self.bearer()?;
        let source_error = |reason: String| Error::SourceRead {
            location: url.to_string(),
            reason,
        };
        let url = Url::parse(url).map_err(|e| source_error(e.to_string()))?;

        let response = self
            .transport
            .execute(ApiRequest::get(url.as_str()))
            .await
            .map_err(|e| source_error(e.to_string()))?;
        if !response.is_success() {
            return Err(source_error(format!("HTTP {}", response.status)));
        }

        info!(url = %url, size = response.body.len(), "Fetched remote attachment");
        let payload = AttachmentPayload::new(name, response.body)
            .with_origin(PayloadOrigin::Remote(url.into()));
        self.upload(message_id, payload).await
    }
}
