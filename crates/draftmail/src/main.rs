//! `draftmail` - create Outlook drafts with attachments of any size.
//!
//! Run `draftmail login-link --state <id>` and sign in, then pass the `code`
//! from the redirect to `draftmail draft`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use draftmail_graph::{AuthState, Draft, GraphConfig, MailClient};
use draftmail_oauth::{AuthSettings, AuthorizationCodeCredential};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, DraftArgs, LoginLinkArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "draftmail=info,draftmail_graph=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = AuthSettings::from_env().context("app registration is incomplete")?;

    match cli.command {
        Command::LoginLink(args) => login_link(&settings, &args),
        Command::Draft(args) => draft(&settings, args).await,
    }
}

fn login_link(settings: &AuthSettings, args: &LoginLinkArgs) -> Result<()> {
    let flow = settings.authorization_code_flow()?;

    if args.json {
        let context = flow.login_context(&args.state);
        println!("{}", serde_json::to_string_pretty(&context)?);
        return Ok(());
    }

    let url = flow.authorization_url(None, Some(args.state.as_str()));
    println!("{url}");
    if args.open {
        opener::open(url.as_str()).context("failed to open the browser")?;
    }
    Ok(())
}

async fn draft(settings: &AuthSettings, args: DraftArgs) -> Result<()> {
    let credential = AuthorizationCodeCredential::new(settings.authorization_code_flow()?, args.code);
    let mut config = GraphConfig::default();
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }

    let client = MailClient::connect_http(credential, config).await?;
    if client.auth_state() != AuthState::TokenAcquired {
        bail!("sign-in failed; run `draftmail login-link` and use the new code");
    }

    let draft = Draft::new(args.subject, args.body, args.to).with_cc(args.cc);
    let message = client.send_draft_email(&draft).await?;
    info!(id = %message.id, "Draft created");

    for path in &args.attachments {
        let name = path.to_string_lossy();
        let result = client
            .attach_local_file(&message.id, path, &name)
            .await
            .with_context(|| format!("attaching {}", path.display()))?;
        info!(name = ?result.name(), chunked = result.is_chunked(), "Attached");
    }

    for url in &args.remote_attachments {
        let result = client
            .attach_remote_file(&message.id, url, &cli::remote_name(url))
            .await
            .with_context(|| format!("attaching {url}"))?;
        info!(name = ?result.name(), chunked = result.is_chunked(), "Attached");
    }

    match &message.web_link {
        Some(link) => println!("{link}"),
        None => {
            warn!("Server returned no web link for the draft");
            println!("{}", message.id);
        }
    }
    Ok(())
}
