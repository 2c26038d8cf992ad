//! Draft messages.
//!
//! Only the fields needed to create a draft are modelled.

mod compose;

pub use compose::DraftComposer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Importance;

/// A draft to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Primary recipient.
    pub to: String,
    /// CC recipients.
    pub cc: Vec<String>,
}

impl Draft {
    /// Creates a draft with a single recipient and no CC.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        html_body: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            html_body: html_body.into(),
            to: to.into(),
            cc: Vec::new(),
        }
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<String>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Adds several CC recipients.
    #[must_use]
    pub fn with_cc<I, A>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.cc.extend(recipients.into_iter().map(Into::into));
        self
    }

    pub(crate) fn to_payload(&self, importance: Importance) -> MessagePayload {
        MessagePayload {
            subject: self.subject.clone(),
            importance,
            body: ItemBody::html(&self.html_body),
            to_recipients: vec![Recipient::new(&self.to)],
            cc_recipients: self.cc.iter().map(Recipient::new).collect(),
        }
    }
}

/// Body of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    /// `HTML` or `Text`.
    pub content_type: String,
    /// Body content.
    pub content: String,
}

impl ItemBody {
    fn html(content: &str) -> Self {
        Self {
            content_type: "HTML".to_string(),
            content: content.to_string(),
        }
    }
}

/// A message recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Mailbox of the recipient.
    pub email_address: EmailAddress,
}

impl Recipient {
    fn new(address: impl Into<String>) -> Self {
        Self {
            email_address: EmailAddress {
                address: address.into(),
                name: None,
            },
        }
    }
}

/// An email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// SMTP address.
    pub address: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Create-draft request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePayload {
    subject: String,
    importance: Importance,
    body: ItemBody,
    to_recipients: Vec<Recipient>,
    cc_recipients: Vec<Recipient>,
}

/// A draft as stored by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMessage {
    /// Server-assigned message identifier.
    pub id: String,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Body.
    #[serde(default)]
    pub body: Option<ItemBody>,
    /// Primary recipients.
    #[serde(default)]
    pub to_recipients: Vec<Recipient>,
    /// CC recipients.
    #[serde(default)]
    pub cc_recipients: Vec<Recipient>,
    /// Whether the message is still a draft.
    #[serde(default)]
    pub is_draft: Option<bool>,
    /// Link that opens the message in Outlook on the web.
    #[serde(default)]
    pub web_link: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_date_time: Option<DateTime<Utc>>,
}

impl DraftMessage {
    /// Addresses of the primary recipients.
    pub fn to(&self) -> impl Iterator<Item = &str> {
        self.to_recipients
            .iter()
            .map(|r| r.email_address.address.as_str())
    }

    /// Addresses of the CC recipients.
    pub fn cc(&self) -> impl Iterator<Item = &str> {
        self.cc_recipients
            .iter()
            .map(|r| r.email_address.address.as_str())
    }
}
