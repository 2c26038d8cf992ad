//! Draft creation.

use draftmail_oauth::Token;
use tracing::{debug, info};

use super::{Draft, DraftMessage};
use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::transport::{ApiRequest, Transport};

/// Builds create-draft requests and sends them.
#[derive(Debug)]
pub struct DraftComposer<'a, T> {
    transport: &'a T,
    config: &'a GraphConfig,
}

impl<'a, T: Transport> DraftComposer<'a, T> {
    /// Creates a composer over `transport`.
    #[must_use]
    pub const fn new(transport: &'a T, config: &'a GraphConfig) -> Self {
        Self { transport, config }
    }

    /// Creates `draft` in the configured messages collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient is blank, the request fails, or the
    /// server answers with a non-success status.
    pub async fn create_draft(&self, draft: &Draft, token: &Token) -> Result<DraftMessage> {
        if draft.to.trim().is_empty() {
            return Err(Error::InvalidInput("draft has no recipient".into()));
        }

        let payload = serde_json::to_value(draft.to_payload(self.config.importance))?;
        let request =
            ApiRequest::post_json(self.config.messages_url(), payload).with_bearer(token);

        debug!(to = %draft.to, cc = draft.cc.len(), "Creating draft");
        let response = self.transport.execute(request).await?.error_for_status()?;
        let message: DraftMessage = response.json()?;

        info!(message_id = %message.id, "Draft created");
        Ok(message)
    }
}
