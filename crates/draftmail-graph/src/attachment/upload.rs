//! Attachment upload strategy.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use draftmail_oauth::Token;
use serde_json::json;
use tracing::{debug, info};

use super::chunk::ChunkPlan;
use super::session::UploadSession;
use super::{AttachmentPayload, AttachmentResult, FileAttachment, UploadReceipt};
use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::transport::{ApiRequest, Transport};

/// Attaches payloads to existing drafts.
#[derive(Debug)]
pub struct AttachmentUploader<'a, T> {
    transport: &'a T,
    config: &'a GraphConfig,
}

impl<'a, T: Transport> AttachmentUploader<'a, T> {
    /// Creates an uploader over `transport`.
    #[must_use]
    pub const fn new(transport: &'a T, config: &'a GraphConfig) -> Self {
        Self { transport, config }
    }

    /// Attaches `payload` to the draft `message_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteRequest`] if the attachment or session request is
    /// rejected and [`Error::TransferIncomplete`] if a chunk write fails.
    pub async fn upload(
        &self,
        message_id: &str,
        payload: AttachmentPayload,
        token: &Token,
    ) -> Result<AttachmentResult> {
        if message_id.trim().is_empty() {
            return Err(Error::InvalidInput("message id is empty".into()));
        }
        if payload.name().is_empty() {
            return Err(Error::InvalidInput("attachment name is empty".into()));
        }

        if payload.len() < self.config.small_attachment_limit {
            self.attach_whole(message_id, payload, token).await
        } else {
            self.upload_chunked(message_id, payload, token).await
        }
    }

    async fn attach_whole(
        &self,
        message_id: &str,
        payload: AttachmentPayload,
        token: &Token,
    ) -> Result<AttachmentResult> {
        let body = json!({
            "@odata.type": "#microsoft.graph.fileAttachment",
            "name": payload.name(),
            "contentBytes": STANDARD.encode(payload.bytes()),
        });
        let request =
            ApiRequest::post_json(self.config.attachments_url(message_id), body).with_bearer(token);

        debug!(message_id, name = payload.name(), size = payload.len(), "Attaching file");
        let response = self.transport.execute(request).await?.error_for_status()?;
        let attachment: FileAttachment = response.json()?;

        info!(message_id, attachment_id = %attachment.id, "Attachment created");
        Ok(AttachmentResult::Attached(attachment))
    }

    async fn upload_chunked(
        &self,
        message_id: &str,
        payload: AttachmentPayload,
        token: &Token,
    ) -> Result<AttachmentResult> {
        let total = payload.len();
        let mut session = UploadSession::create(
            self.transport,
            &self.config.upload_session_url(message_id),
            payload.name(),
            total,
            token,
        )
        .await?;

        let plan = ChunkPlan::new(total, self.config.chunk_size);
        let mut location = None;
        let mut chunks = 0;

        for range in &plan {
            let data = slice(payload.bytes(), range.start, range.end);
            match session.put_chunk(self.transport, range, data).await {
                Ok(loc) => {
                    location = loc.or(location);
                    chunks += 1;
                }
                Err(e) => {
                    return Err(Error::TransferIncomplete {
                        acknowledged: session.acknowledged(),
                        total,
                        source: Box::new(e),
                    });
                }
            }
        }

        info!(message_id, name = payload.name(), size = total, chunks, "Attachment uploaded");
        Ok(AttachmentResult::Uploaded(UploadReceipt {
            name: payload.name().to_string(),
            size: total,
            chunks,
            location,
        }))
    }
}

/// Returns bytes `start..=end` without copying.
// Ranges come from a plan over `bytes.len()`, so they fit in usize
#[allow(clippy::cast_possible_truncation)]
fn slice(bytes: &Bytes, start: u64, end: u64) -> Bytes {
    bytes.slice(start as usize..=end as usize)
}
