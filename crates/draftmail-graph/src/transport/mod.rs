//! HTTP transport seam.
//!
//! All requests issued by the client are described as [`ApiRequest`] values and
//! handed to a [`Transport`]. The default implementation is
//! [`ReqwestTransport`]; tests substitute a recording transport.

mod http;

pub use http::ReqwestTransport;

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use draftmail_oauth::Token;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON document.
    Json(serde_json::Value),
    /// Raw bytes.
    Bytes(Bytes),
}

/// A single HTTP request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Bearer token sent in the `Authorization` header, if any.
    pub bearer: Option<String>,
    /// Extra headers.
    pub headers: HeaderMap,
    /// Body.
    pub body: RequestBody,
}

impl ApiRequest {
    /// Creates a request without body or credentials.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// `GET url`.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// `POST url` with a JSON body.
    #[must_use]
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(Method::POST, url);
        request.body = RequestBody::Json(body);
        request
    }

    /// `PUT url` with a raw body.
    #[must_use]
    pub fn put_bytes(url: impl Into<String>, body: Bytes) -> Self {
        let mut request = Self::new(Method::PUT, url);
        request.body = RequestBody::Bytes(body);
        request
    }

    /// Authorizes the request with `token`.
    #[must_use]
    pub fn with_bearer(mut self, token: &Token) -> Self {
        self.bearer = Some(token.access_token.clone());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns a header value as text.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the JSON body, if the request has one.
    #[must_use]
    pub const fn json(&self) -> Option<&serde_json::Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw body, if the request has one.
    #[must_use]
    pub const fn bytes(&self) -> Option<&Bytes> {
        match &self.body {
            RequestBody::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl ApiResponse {
    /// Creates a response without headers.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value as text.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Turns non-2xx responses into [`Error::RemoteRequest`].
    ///
    /// # Errors
    ///
    /// Returns the status and raw body for any non-success status.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::remote(self.status, &self.body))
        }
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Executes HTTP requests.
pub trait Transport: Send + Sync {
    /// Sends `request` and reads the whole response.
    ///
    /// A non-success status is not an error at this level.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or the body not read.
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send {
        (**self).execute(request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_TYPE;

    #[test]
    fn test_request_builders() {
        let token = Token::bearer("abc");
        let request = ApiRequest::post_json("https://graph.test/messages", serde_json::json!({}))
            .with_bearer(&token)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.bearer.as_deref(), Some("abc"));
        assert_eq!(request.header(&CONTENT_TYPE), Some("application/json"));
        assert!(request.json().is_some());
        assert!(request.bytes().is_none());
    }

    #[test]
    fn test_error_for_status() {
        let ok = ApiResponse::new(StatusCode::CREATED, r#"{"id":"1"}"#);
        assert!(ok.error_for_status().is_ok());

        let err = ApiResponse::new(StatusCode::FORBIDDEN, "denied")
            .error_for_status()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RemoteRequest { status: 403, ref body } if body == "denied"
        ));
    }
}
