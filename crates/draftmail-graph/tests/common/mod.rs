//! Shared fixtures for mail client tests.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use draftmail_graph::{ApiRequest, ApiResponse, GraphConfig, MailClient, Transport};
use draftmail_oauth::{StaticToken, Token, TokenSource};
use reqwest::StatusCode;
use reqwest::header::{HeaderValue, LOCATION};

pub const MIB: usize = 1024 * 1024;
pub const BASE_URL: &str = "https://graph.test/v1.0/me/messages";
pub const UPLOAD_URL: &str = "https://upload.test/sessions/42?authtoken=opaque";

type Handler = dyn Fn(&ApiRequest, usize) -> draftmail_graph::Result<ApiResponse> + Send + Sync;

/// Transport that records every request and answers through a handler.
///
/// The handler receives the request and its position in the recording.
pub struct MockTransport {
    requests: Mutex<Vec<ApiRequest>>,
    handler: Box<Handler>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest, usize) -> ApiResponse + Send + Sync + 'static,
    {
        Self::fallible(move |request, position| Ok(handler(request, position)))
    }

    /// Like [`new`](Self::new), but the handler may fail the way a broken
    /// connection does.
    pub fn fallible<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest, usize) -> draftmail_graph::Result<ApiResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        })
    }

    /// Answers like the mail API does on the happy path.
    pub fn graph() -> Arc<Self> {
        Self::new(|request, _| graph_answer(request))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == reqwest::Method::PUT)
            .collect()
    }
}

impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> draftmail_graph::Result<ApiResponse> {
        let position = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        (self.handler)(&request, position)
    }
}

/// Happy-path answers keyed on method and URL.
pub fn graph_answer(request: &ApiRequest) -> ApiResponse {
    let url = request.url.as_str();
    match request.method.as_str() {
        "POST" if url == BASE_URL => ApiResponse::new(
            StatusCode::CREATED,
            r#"{"id":"AAMk-draft-1","subject":"Hi","isDraft":true}"#,
        ),
        "POST" if url.ends_with("/attachments/createUploadSession") => ApiResponse::new(
            StatusCode::CREATED,
            format!(
                r#"{{"uploadUrl":"{UPLOAD_URL}","expirationDateTime":"2030-01-01T00:00:00Z","nextExpectedRanges":["0-"]}}"#
            ),
        ),
        "POST" if url.ends_with("/attachments") => ApiResponse::new(
            StatusCode::CREATED,
            r#"{"id":"AAMk-att-1","name":"report.pdf","size":2097152}"#,
        ),
        "PUT" if url == UPLOAD_URL => put_answer(request),
        "GET" => ApiResponse::new(StatusCode::OK, Vec::new()),
        _ => ApiResponse::new(StatusCode::NOT_FOUND, "no route"),
    }
}

/// 200 with the next expected range, or 201 + Location on the last chunk.
pub fn put_answer(request: &ApiRequest) -> ApiResponse {
    let range = request
        .header(&reqwest::header::CONTENT_RANGE)
        .unwrap()
        .to_string();
    let (span, total) = range.trim_start_matches("bytes ").split_once('/').unwrap();
    let end: u64 = span.split_once('-').unwrap().1.parse().unwrap();
    let total: u64 = total.parse().unwrap();

    if end + 1 == total {
        ApiResponse::new(StatusCode::CREATED, Vec::new()).with_header(
            LOCATION,
            HeaderValue::from_static("https://graph.test/attachments/AAMk-att-big"),
        )
    } else {
        ApiResponse::new(
            StatusCode::OK,
            format!(r#"{{"nextExpectedRanges":["{}-"]}}"#, end + 1),
        )
    }
}

pub fn config() -> GraphConfig {
    GraphConfig::new().with_base_url(BASE_URL)
}

pub fn valid_token() -> Token {
    Token::bearer("token-abc").with_expires_at(Utc::now() + Duration::hours(1))
}

pub async fn client(transport: Arc<MockTransport>) -> MailClient<StaticToken, Arc<MockTransport>> {
    MailClient::connect(StaticToken(valid_token()), transport, config())
        .await
        .unwrap()
}

/// Deterministic payload so chunk contents can be checked.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Token source that always fails.
pub struct RejectingSource;

impl TokenSource for RejectingSource {
    async fn token(&self, _scopes: &[String]) -> draftmail_oauth::Result<Token> {
        Err(draftmail_oauth::Error::oauth_error(
            "invalid_grant",
            "AADSTS54005: OAuth2 Authorization code was already redeemed",
        ))
    }
}
