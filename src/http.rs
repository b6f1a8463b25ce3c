// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Plumbing for talking to APIs over HTTP.
//!
//! This module does not know anything about Bluesky. It describes a
//! request in a way that does not tie it to a particular HTTP client, a
//! response that has already been read into memory, and the errors that
//! can occur while moving one to the other.

pub use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::{error, fmt};

/// An appropriate user agent to use when making HTTP requests.
pub fn user_agent() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// The body of a POST request.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// A JSON document, sent with `Content-Type: application/json`.
    Json(serde_json::Value),

    /// Raw bytes. The caller is responsible for supplying an appropriate
    /// `Content-Type` header.
    Bytes(Vec<u8>),
}

/// A POST request that has not been sent yet.
#[derive(Clone, Debug)]
pub struct Request {
    uri: String,
    headers: HeaderMap,
    body: Body,
}

impl Request {
    /// Creates a new request to `uri` with the given `body` and no headers.
    pub fn new(uri: impl Into<String>, body: Body) -> Self {
        let uri = uri.into();
        let headers = HeaderMap::new();
        Self { uri, headers, body }
    }

    /// Merges `headers` into the request's headers.
    ///
    /// Headers that are already present are replaced.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets a single header, replacing any previous value.
    pub fn header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Where the request will be sent.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The value of the header `name`, if it is set and is valid text.
    pub fn header_value(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// All of the request's headers.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Splits the request into its parts.
    pub fn into_parts(self) -> (String, HeaderMap, Body) {
        (self.uri, self.headers, self.body)
    }
}

/// A response whose body has been read completely.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    body: String,
}

impl Response {
    /// Creates a new response.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self { status, body }
    }

    /// The HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The raw response body.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parses the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> HTTPResult<T> {
        serde_json::from_str(&self.body).map_err(HTTPError::Deserialization)
    }
}

/// The result of an HTTP request.
pub type HTTPResult<T> = Result<T, HTTPError>;

/// Indicates an error has occurred when making an HTTP call.
#[derive(Debug)]
pub enum HTTPError {
    /// An error retrieving the body of a response.
    Body(reqwest::Error),

    /// An error that occurred while making an HTTP request.
    Request(reqwest::Error),

    /// The request timed out.
    ///
    /// Unlike other errors, timeouts are considered transient, and
    /// callers may try the request again.
    Timeout(Box<dyn error::Error + Send + Sync>),

    /// An error that occurred while trying to serialize a POST body.
    Serialization(serde_json::Error),

    /// An error that occurred while trying to parse a response body.
    Deserialization(serde_json::Error),

    /// A header value that cannot be sent over HTTP.
    InvalidHeader(header::InvalidHeaderValue),
}

impl HTTPError {
    /// True if the error is transient and the request can be retried.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HTTPError::Timeout(_))
    }

    /// Sorts an error from reqwest into a request error or a timeout.
    ///
    /// A timeout while connecting is a connection failure, not a timeout:
    /// only requests that reached the server are worth trying again.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() && !err.is_connect() {
            HTTPError::Timeout(Box::new(err))
        } else {
            HTTPError::Request(err)
        }
    }

    /// Sorts an error from reqwest that occurred while reading a body into
    /// a body error or a timeout.
    pub fn from_body(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HTTPError::Timeout(Box::new(err))
        } else {
            HTTPError::Body(err)
        }
    }
}

impl From<header::InvalidHeaderValue> for HTTPError {
    fn from(err: header::InvalidHeaderValue) -> Self {
        HTTPError::InvalidHeader(err)
    }
}

impl fmt::Display for HTTPError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HTTPError::Body(err) => write!(f, "Error retrieving body of HTTP response: {err}"),
            HTTPError::Request(err) => write!(f, "Error while making HTTP request: {err}"),
            HTTPError::Timeout(err) => write!(f, "HTTP request timed out: {err}"),
            HTTPError::Serialization(err) => write!(f, "Error serializing POST body: {err}"),
            HTTPError::Deserialization(err) => {
                write!(f, "Error parsing body of HTTP response: {err}")
            }
            HTTPError::InvalidHeader(err) => write!(f, "Invalid header value: {err}"),
        }
    }
}

impl error::Error for HTTPError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            HTTPError::Body(err) => Some(err),
            HTTPError::Request(err) => Some(err),
            HTTPError::Timeout(err) => Some(err.as_ref()),
            HTTPError::Serialization(err) => Some(err),
            HTTPError::Deserialization(err) => Some(err),
            HTTPError::InvalidHeader(err) => Some(err),
        }
    }
}
