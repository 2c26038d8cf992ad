//! File attachments.
//!
//! Payloads below [`GraphConfig::small_attachment_limit`] are attached with a
//! single request carrying the base64 content. Larger ones go through an
//! [`UploadSession`] in [`GraphConfig::chunk_size`] pieces.
//!
//! [`GraphConfig::small_attachment_limit`]: crate::config::GraphConfig::small_attachment_limit
//! [`GraphConfig::chunk_size`]: crate::config::GraphConfig::chunk_size

mod chunk;
mod session;
mod upload;

pub use chunk::{ChunkPlan, ChunkRange, Chunks};
pub use session::UploadSession;
pub use upload::AttachmentUploader;

use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Reduces a name that may carry a path to its final component.
///
/// Both `/` and `\` count as separators.
#[must_use]
pub fn display_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Where attachment bytes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadOrigin {
    /// Read from the local filesystem.
    Local(PathBuf),
    /// Supplied by the caller.
    Memory,
    /// Downloaded from a URL.
    Remote(String),
}

/// Bytes to attach, with the name shown to recipients.
#[derive(Debug, Clone)]
pub struct AttachmentPayload {
    name: String,
    bytes: Bytes,
    origin: PayloadOrigin,
}

impl AttachmentPayload {
    /// Creates an in-memory payload. Any path prefix of `name` is dropped.
    #[must_use]
    pub fn new(name: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: display_name(name).to_string(),
            bytes: bytes.into(),
            origin: PayloadOrigin::Memory,
        }
    }

    /// Records where the bytes came from.
    #[must_use]
    pub fn with_origin(mut self, origin: PayloadOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content.
    #[must_use]
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Origin of the content.
    #[must_use]
    pub const fn origin(&self) -> &PayloadOrigin {
        &self.origin
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// True for a zero-byte payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Attachment metadata returned for a single-request attachment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    /// Attachment identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// MIME type detected by the server.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Whether the attachment is inline.
    #[serde(default)]
    pub is_inline: Option<bool>,
    /// Last modification time.
    #[serde(default)]
    pub last_modified_date_time: Option<DateTime<Utc>>,
}

/// Acknowledgment of a completed upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Display name sent when the session was opened.
    pub name: String,
    /// Bytes uploaded.
    pub size: u64,
    /// Number of chunk writes.
    pub chunks: usize,
    /// URL of the created attachment, when the server reports one.
    pub location: Option<String>,
}

/// Outcome of attaching a payload.
#[derive(Debug, Clone)]
pub enum AttachmentResult {
    /// Created by a single request.
    Attached(FileAttachment),
    /// Uploaded through an upload session.
    Uploaded(UploadReceipt),
}

impl AttachmentResult {
    /// True if the payload went through an upload session.
    #[must_use]
    pub const fn is_chunked(&self) -> bool {
        matches!(self, Self::Uploaded(_))
    }

    /// Display name, when known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Attached(attachment) => attachment.name.as_deref(),
            Self::Uploaded(receipt) => Some(&receipt.name),
        }
    }
}
