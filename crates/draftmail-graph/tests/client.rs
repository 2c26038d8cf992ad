//! Draft creation and token lifecycle tests.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Utc};
use draftmail_graph::{ApiResponse, AuthState, Draft, Error, MailClient};
use draftmail_oauth::{StaticToken, Token, TokenSource};
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{BASE_URL, MockTransport, RejectingSource, client, config, valid_token};

#[tokio::test]
async fn test_draft_without_cc_posts_empty_cc_list() {
    let transport = MockTransport::graph();
    let client = client(Arc::clone(&transport)).await;

    let message = client
        .send_draft_email(&Draft::new("Hi", "<b>hi</b>", "a@x.com"))
        .await
        .unwrap();
    assert_eq!(message.id, "AAMk-draft-1");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].url, BASE_URL);
    assert_eq!(requests[0].bearer.as_deref(), Some("token-abc"));
    assert_eq!(
        requests[0].json().unwrap(),
        &json!({
            "subject": "Hi",
            "importance": "Low",
            "body": { "contentType": "HTML", "content": "<b>hi</b>" },
            "toRecipients": [ { "emailAddress": { "address": "a@x.com" } } ],
            "ccRecipients": []
        })
    );
}

#[tokio::test]
async fn test_draft_with_cc_lists_every_address() {
    let transport = MockTransport::graph();
    let client = client(Arc::clone(&transport)).await;

    let draft = Draft::new("Renewal", "<p>See attached</p>", "client@x.com")
        .with_cc(["agent@x.com", "audit@x.com"]);
    client.send_draft_email(&draft).await.unwrap();

    let body = transport.requests()[0].json().unwrap().clone();
    assert_eq!(
        body["ccRecipients"],
        json!([
            { "emailAddress": { "address": "agent@x.com" } },
            { "emailAddress": { "address": "audit@x.com" } }
        ])
    );
}

#[tokio::test]
async fn test_rejected_draft_carries_status_and_body() {
    let transport = MockTransport::new(|_, _| {
        ApiResponse::new(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":"ErrorInvalidRecipients"}}"#,
        )
    });
    let client = client(Arc::clone(&transport)).await;

    let err = client
        .send_draft_email(&Draft::new("Hi", "<b>hi</b>", "not-an-address"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RemoteRequest { status: 400, ref body } if body.contains("ErrorInvalidRecipients")
    ));
}

#[tokio::test]
async fn test_blank_recipient_is_rejected_locally() {
    let transport = MockTransport::graph();
    let client = client(Arc::clone(&transport)).await;

    let err = client
        .send_draft_email(&Draft::new("Hi", "body", "  "))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_failed_acquisition_blocks_every_operation() {
    let transport = MockTransport::graph();
    let client = MailClient::connect(RejectingSource, Arc::clone(&transport), config())
        .await
        .unwrap();

    assert_eq!(client.auth_state(), AuthState::ReAuthenticationRequired);
    assert!(client.token().is_none());

    let err = client
        .send_draft_email(&Draft::new("Hi", "<b>hi</b>", "a@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert!(err.is_authentication());

    let err = client
        .attach_bytes("AAMk-draft-1", vec![0_u8; 16], "a.bin")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));

    let err = client
        .attach_remote_file("AAMk-draft-1", "https://files.test/a.bin", "a.bin")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_expired_token_is_not_sent() {
    let transport = MockTransport::graph();
    let expired = Token::bearer("stale").with_expires_at(Utc::now() + Duration::seconds(10));
    let client = MailClient::new(StaticToken(expired), Arc::clone(&transport), config())
        .unwrap();
    assert_eq!(client.auth_state(), AuthState::Unauthenticated);

    // Token expires within the buffer, so the source refuses it
    let mut client = client;
    assert!(client.refresh_token().await.is_err());
    assert_eq!(client.auth_state(), AuthState::ReAuthenticationRequired);

    let err = client
        .send_draft_email(&Draft::new("Hi", "<b>hi</b>", "a@x.com"))
        .await
        .unwrap_err();
    assert!(err.is_authentication());
    assert!(transport.requests().is_empty());
}

/// Fails until `allow` is set, then hands out a valid token.
struct FlakySource {
    allow: Arc<AtomicBool>,
}

impl TokenSource for FlakySource {
    async fn token(&self, _scopes: &[String]) -> draftmail_oauth::Result<Token> {
        if self.allow.load(Ordering::SeqCst) {
            Ok(valid_token())
        } else {
            Err(draftmail_oauth::Error::TokenExpired)
        }
    }
}

#[tokio::test]
async fn test_explicit_refresh_recovers() {
    let transport = MockTransport::graph();
    let allow = Arc::new(AtomicBool::new(false));
    let source = FlakySource {
        allow: Arc::clone(&allow),
    };
    let mut client = MailClient::connect(source, Arc::clone(&transport), config())
        .await
        .unwrap();
    assert_eq!(client.auth_state(), AuthState::ReAuthenticationRequired);

    // Operations do not retry on their own
    assert!(
        client
            .send_draft_email(&Draft::new("Hi", "b", "a@x.com"))
            .await
            .is_err()
    );

    // Re-authorization happened out of band
    allow.store(true, Ordering::SeqCst);
    let token = client.refresh_token().await.unwrap();
    assert_eq!(token.access_token, "token-abc");
    assert_eq!(client.auth_state(), AuthState::TokenAcquired);

    client
        .send_draft_email(&Draft::new("Hi", "b", "a@x.com"))
        .await
        .unwrap();
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_independent_operations_run_concurrently() {
    let transport = MockTransport::graph();
    let client = client(Arc::clone(&transport)).await;

    let draft_a = Draft::new("A", "a", "a@x.com");
    let draft_b = Draft::new("B", "b", "b@x.com");
    let (a, b, c) = tokio::join!(
        client.send_draft_email(&draft_a),
        client.send_draft_email(&draft_b),
        client.attach_bytes("AAMk-draft-1", vec![1_u8; 64], "c.bin"),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(transport.requests().len(), 3);
}

#[test]
fn test_invalid_config_is_rejected() {
    let transport = MockTransport::graph();
    let result = MailClient::new(
        StaticToken(valid_token()),
        transport,
        config().with_chunk_size(0),
    );
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}
