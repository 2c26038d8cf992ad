//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use percent_encoding::percent_decode_str;
use url::Url;

/// Create Outlook drafts with attachments of any size.
///
/// App registration details come from `CLIENT_ID`, `TENANT_ID`, `REDIRECT_URI`
/// and, for confidential clients, `CLIENT_SECRET`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the sign-in link for the authorization code flow.
    LoginLink(LoginLinkArgs),
    /// Redeem an authorization code, create a draft and attach files to it.
    Draft(DraftArgs),
}

/// Arguments of `login-link`.
#[derive(Args, Debug)]
pub struct LoginLinkArgs {
    /// Value echoed back in the redirect, e.g. the record the draft belongs to.
    #[arg(long)]
    pub state: String,
    /// Open the link in the default browser.
    #[arg(long)]
    pub open: bool,
    /// Print the template context (`{"ms_auth_link": ...}`) instead of the bare link.
    #[arg(long, conflicts_with = "open")]
    pub json: bool,
}

/// Arguments of `draft`.
#[derive(Args, Debug)]
pub struct DraftArgs {
    /// Authorization code from the sign-in redirect.
    #[arg(long)]
    pub code: String,
    /// Subject line.
    #[arg(long)]
    pub subject: String,
    /// HTML body.
    #[arg(long)]
    pub body: String,
    /// Primary recipient.
    #[arg(long)]
    pub to: String,
    /// CC recipient; repeat for more.
    #[arg(long)]
    pub cc: Vec<String>,
    /// Local file to attach; repeat for more.
    #[arg(long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
    /// URL to download and attach; repeat for more.
    #[arg(long = "attach-url", value_name = "URL")]
    pub remote_attachments: Vec<String>,
    /// Messages endpoint, for national clouds or shared mailboxes.
    #[arg(long, env = "DRAFTMAIL_BASE_URL")]
    pub base_url: Option<String>,
}

/// Attachment name for a downloaded file: the last non-empty path segment
/// of `url`, percent-decoded.
///
/// Falls back to `attachment` when the URL has no usable segment; an
/// unparsable URL is left for the upload to report.
pub fn remote_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .rev()
                .find(|segment| !segment.is_empty())
                .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        })
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "attachment".to_string())
}
