//! # draftmail-graph
//!
//! Draft creation and attachment upload over the Microsoft Graph mail API.
//!
//! ## Features
//!
//! - **Drafts**: subject, HTML body, one recipient, any number of CCs
//! - **Attachments**: local files, in-memory buffers and remote URLs
//! - **Large attachments**: upload sessions written in ordered 4 MiB chunks
//! - **Pluggable transport**: every request goes through [`Transport`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use draftmail_graph::{Draft, GraphConfig, MailClient};
//! use draftmail_oauth::{StaticToken, Token};
//!
//! #[tokio::main]
//! async fn main() -> draftmail_graph::Result<()> {
//!     let source = StaticToken(Token::bearer("eyJ0eXAi..."));
//!     let client = MailClient::connect_http(source, GraphConfig::default()).await?;
//!
//!     let draft = Draft::new("Quote", "<p>Please find the quote attached.</p>", "a@x.com")
//!         .cc("ops@x.com");
//!     let message = client.send_draft_email(&draft).await?;
//!
//!     client.attach_local_file(&message.id, "/tmp/quote.pdf", "quote.pdf").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Upload protocol
//!
//! ```text
//! size < 3 MiB:   POST {messages}/{id}/attachments            (base64 body)
//! size >= 3 MiB:  POST {messages}/{id}/attachments/createUploadSession
//!                 PUT  {uploadUrl}  Content-Range: bytes 0-4194303/{size}
//!                 PUT  {uploadUrl}  Content-Range: bytes 4194304-.../{size}
//!                 ...
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
pub mod client;
pub mod config;
mod error;
pub mod message;
pub mod transport;

pub use attachment::{
    AttachmentPayload, AttachmentResult, AttachmentUploader, ChunkPlan, ChunkRange,
    FileAttachment, PayloadOrigin, UploadReceipt, UploadSession, display_name,
};
pub use client::{AuthState, MailClient};
pub use config::{GraphConfig, Importance};
pub use error::{Error, Result};
pub use message::{Draft, DraftComposer, DraftMessage};
pub use transport::{ApiRequest, ApiResponse, RequestBody, ReqwestTransport, Transport};
