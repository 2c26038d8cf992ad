//! Resumable upload sessions.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use draftmail_oauth::Token;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, HeaderValue, LOCATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chunk::ChunkRange;
use crate::error::{Error, Result};
use crate::transport::{ApiRequest, Transport};

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    #[serde(rename = "AttachmentItem")]
    attachment_item: AttachmentItem<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentItem<'a> {
    attachment_type: &'static str,
    name: &'a str,
    size: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionStatus {
    #[serde(default)]
    upload_url: Option<String>,
    #[serde(default)]
    expiration_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    next_expected_ranges: Vec<String>,
}

/// Server-side handle for an attachment uploaded in chunks.
///
/// Tracks how many bytes the server has acknowledged. Chunks must arrive in
/// order; the session never rewinds.
#[derive(Debug, Clone)]
pub struct UploadSession {
    upload_url: String,
    total: u64,
    acknowledged: u64,
    expires_at: Option<DateTime<Utc>>,
    next_expected_ranges: Vec<String>,
}

impl UploadSession {
    /// Opens a session for an attachment of `total` bytes named `name`.
    ///
    /// # Errors
    ///
    /// Returns the raw failure on a non-success status, or
    /// [`Error::InvalidResponse`] if the answer has no upload URL.
    pub async fn create<T: Transport>(
        transport: &T,
        session_url: &str,
        name: &str,
        total: u64,
        token: &Token,
    ) -> Result<Self> {
        let body = serde_json::to_value(SessionRequest {
            attachment_item: AttachmentItem {
                attachment_type: "file",
                name,
                size: total,
            },
        })?;
        let request = ApiRequest::post_json(session_url, body).with_bearer(token);

        let response = transport.execute(request).await?.error_for_status()?;
        let status: SessionStatus = response.json()?;
        let upload_url = status
            .upload_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::InvalidResponse("upload session without uploadUrl".into()))?;

        debug!(name, total, expires_at = ?status.expiration_date_time, "Upload session created");
        Ok(Self {
            upload_url,
            total,
            acknowledged: 0,
            expires_at: status.expiration_date_time,
            next_expected_ranges: status.next_expected_ranges,
        })
    }

    /// URL chunks are written to. It carries its own authorization.
    #[must_use]
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Declared size of the attachment.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Bytes the server has acknowledged so far.
    #[must_use]
    pub const fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    /// Bytes still to be written.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.total - self.acknowledged
    }

    /// True once every byte has been acknowledged.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.acknowledged == self.total
    }

    /// When the server will discard the session.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Ranges the server reported as still missing, e.g. `["4194304-"]`.
    #[must_use]
    pub fn next_expected_ranges(&self) -> &[String] {
        &self.next_expected_ranges
    }

    /// Writes one chunk. Returns the `Location` header of the final answer, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the chunk does not start at the
    /// acknowledged offset or its data length disagrees with the range, and
    /// the raw failure if the write is rejected.
    pub async fn put_chunk<T: Transport>(
        &mut self,
        transport: &T,
        range: ChunkRange,
        data: Bytes,
    ) -> Result<Option<String>> {
        if range.start != self.acknowledged || range.total != self.total {
            return Err(Error::InvalidInput(format!(
                "chunk {range} does not continue at byte {} of {}",
                self.acknowledged, self.total
            )));
        }
        if data.len() as u64 != range.size() {
            return Err(Error::InvalidInput(format!(
                "chunk {range} carries {} bytes",
                data.len()
            )));
        }

        let request = ApiRequest::put_bytes(&self.upload_url, data)
            .with_header(CONTENT_LENGTH, HeaderValue::from(range.size()))
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            )
            .with_header(CONTENT_RANGE, HeaderValue::from_str(&range.content_range())?);

        debug!(index = range.index, range = %range, "Writing chunk");
        let response = transport.execute(request).await?.error_for_status()?;
        self.acknowledged = range.end + 1;

        // Intermediate answers report what the server still expects
        if let Ok(status) = response.json::<SessionStatus>() {
            self.next_expected_ranges = status.next_expected_ranges;
            if status.expiration_date_time.is_some() {
                self.expires_at = status.expiration_date_time;
            }
        } else {
            self.next_expected_ranges.clear();
        }

        Ok(response.header(&LOCATION).map(ToString::to_string))
    }
}
