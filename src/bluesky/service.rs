// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Bluesky API.
//!
//! Service structures in this module provide a low-level way to send
//! requests to a Bluesky agent, essentially a specialized HTTPS client.
//! They know nothing about sessions or records; that is the job of the
//! [client](crate::bluesky::client).

use crate::http::{self, Body, HTTPError, HTTPResult, Request, Response};
use log::trace;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// A service for sending requests to a Bluesky agent.
///
/// Using this trait, clients can implement different ways of connecting
/// to the Bluesky API, such as an actual connector for production code,
/// and a deterministic connector for testing purposes.
pub trait Service {
    /// Sends a POST `request` and returns the response, whatever its
    /// status.
    fn post(&self, request: Request) -> impl Future<Output = HTTPResult<Response>> + Send;
}

impl<T: Service + Sync> Service for &T {
    fn post(&self, request: Request) -> impl Future<Output = HTTPResult<Response>> + Send {
        (**self).post(request)
    }
}

/// A service that contacts a Bluesky agent over HTTPS.
#[derive(Debug)]
pub struct XrpcService {
    client: Client,
}

impl XrpcService {
    /// How long to wait for data from the agent before giving up.
    pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

    /// How long to wait for a connection to the agent.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new service.
    ///
    /// This only fails if the HTTP client cannot be initialized, for
    /// example if no TLS backend is available.
    pub fn new() -> HTTPResult<Self> {
        Self::with_timeouts(Self::READ_TIMEOUT, Self::CONNECT_TIMEOUT)
    }

    /// Creates a new service that gives up on reads after `read_timeout`
    /// and on connecting after `connect_timeout`.
    pub fn with_timeouts(read_timeout: Duration, connect_timeout: Duration) -> HTTPResult<Self> {
        let client = ClientBuilder::new()
            .user_agent(http::user_agent())
            .read_timeout(read_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(HTTPError::Request)?;
        Ok(Self { client })
    }
}

impl Service for XrpcService {
    // This is covered by the bluesky_service_https integration test.
    async fn post(&self, request: Request) -> HTTPResult<Response> {
        let (uri, headers, body) = request.into_parts();
        trace!("POST {uri}");

        let builder = self.client.post(&uri).headers(headers);
        let builder = match body {
            Body::Json(value) => builder.json(&value),
            Body::Bytes(bytes) => builder.body(bytes),
        };

        let resp = builder.send().await.map_err(HTTPError::from_request)?;
        let status = resp.status();
        let text = resp.text().await.map_err(HTTPError::from_body)?;
        trace!("POST {uri} returned HTTP {status}");
        Ok(Response::new(status, text))
    }
}
