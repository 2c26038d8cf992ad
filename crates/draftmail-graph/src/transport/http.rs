//! `reqwest`-backed transport.

use std::time::Duration;

use reqwest::Client;
use tracing::trace;

use super::{ApiRequest, ApiResponse, RequestBody, Transport};
use crate::error::Result;

/// Transport sending requests with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let ApiRequest {
            method,
            url,
            bearer,
            headers,
            body,
        } = request;

        trace!(%method, %url, "Sending request");

        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Bytes(bytes) => builder.body(bytes),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        trace!(%status, len = body.len(), "Received response");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
