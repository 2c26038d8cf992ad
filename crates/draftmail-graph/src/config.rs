//! Mail API client configuration.

use std::time::Duration;

use draftmail_oauth::provider::MAIL_SCOPES;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

/// Messages collection of the signed-in user.
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0/me/messages";

/// Attachments smaller than this go up in a single request (3 MiB).
pub const SMALL_ATTACHMENT_LIMIT: u64 = 3 * 1024 * 1024;

/// Size of each chunk written to an upload session (4 MiB).
pub const UPLOAD_CHUNK_SIZE: u64 = 4 * 1024 * 1024;

/// Importance marker set on created drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Importance {
    /// Low importance.
    #[default]
    Low,
    /// Normal importance.
    Normal,
    /// High importance.
    High,
}

/// Mail API client configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Messages collection URL; drafts are created here.
    pub base_url: String,
    /// Scopes requested from the token source.
    pub scopes: Vec<String>,
    /// Importance of created drafts.
    pub importance: Importance,
    /// Payloads of at least this many bytes use an upload session.
    pub small_attachment_limit: u64,
    /// Chunk size for upload sessions.
    pub chunk_size: u64,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            scopes: MAIL_SCOPES.iter().map(ToString::to_string).collect(),
            importance: Importance::default(),
            small_attachment_limit: SMALL_ATTACHMENT_LIMIT,
            chunk_size: UPLOAD_CHUNK_SIZE,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl GraphConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the messages collection URL (e.g. a shared mailbox).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the importance of created drafts.
    #[must_use]
    pub const fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    /// Sets the single-request size limit.
    #[must_use]
    pub const fn with_small_attachment_limit(mut self, limit: u64) -> Self {
        self.small_attachment_limit = limit;
        self
    }

    /// Sets the upload chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, size: u64) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or a size is zero.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)?;
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".into()));
        }
        if self.small_attachment_limit == 0 {
            return Err(Error::InvalidConfig(
                "small_attachment_limit must be positive".into(),
            ));
        }
        Ok(())
    }

    /// URL drafts are posted to.
    #[must_use]
    pub fn messages_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// URL of a message's attachments collection.
    #[must_use]
    pub fn attachments_url(&self, message_id: &str) -> String {
        format!("{}/{message_id}/attachments", self.messages_url())
    }

    /// URL that opens an upload session for a message.
    #[must_use]
    pub fn upload_session_url(&self, message_id: &str) -> String {
        format!("{}/createUploadSession", self.attachments_url(message_id))
    }
}
