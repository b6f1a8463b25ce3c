// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Clients for publishing posts to Bluesky.

use crate::auth::Credentials;
use crate::bluesky::facet;
use crate::bluesky::record::{
    CreateRecord, CreateRecordResponse, ErrorResponse, Image, PostRecord, SessionResponse,
    UploadBlobResponse,
};
use crate::bluesky::service::{Service, XrpcService};
use crate::clock::{Clock, SystemClock};
use crate::conf::{self, Settings};
use crate::http::{Body, HTTPError, Request, Response, StatusCode};
use crate::media::Media;
use crate::post::Post;
use crate::retry::RetryPolicy;
use futures::future::join_all;
use log::{debug, info};
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::fmt;
use thiserror::Error;

/// An authenticated Bluesky session.
///
/// A session is obtained once, by [`Bluesky::auth()`], and is used for
/// every call the client makes after that. It is never refreshed.
#[derive(Clone, PartialEq)]
pub struct Session {
    access_jwt: String,
    did: String,
    handle: String,
}

impl Session {
    /// The decentralized identifier of the account, such as
    /// `did:plc:z72i7hdynmk6r22z27h6tvur`.
    pub fn did(&self) -> &str {
        &self.did
    }

    /// The account's handle, such as `alice.bsky.social`.
    pub fn handle(&self) -> &str {
        &self.handle
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_jwt", &"********")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish()
    }
}

impl From<SessionResponse> for Session {
    fn from(resp: SessionResponse) -> Self {
        Self {
            access_jwt: resp.access_jwt,
            did: resp.did,
            handle: resp.handle,
        }
    }
}

/// Publishes posts to a Bluesky account.
///
/// A client starts out unauthenticated. Call [`Bluesky::auth()`] once to
/// log in; after that the client can [upload media](Bluesky::upload) and
/// [publish posts](Bluesky::post). Calling those methods before logging in
/// returns [`Error::Unauthenticated`].
///
/// ```no_run
/// # async fn run() -> Result<(), skypost::bluesky::Error> {
/// use skypost::bluesky::Bluesky;
/// use skypost::conf::Settings;
/// use skypost::post::Post;
///
/// let mut client = Bluesky::new(&Settings::from_env())?;
/// client.auth().await?;
/// let url = client.post(&Post::new("Hello from https://example.com")).await?;
/// println!("{url}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bluesky<S: Service, C: Clock = SystemClock> {
    service: S,
    clock: C,
    retry: RetryPolicy,
    agent: String,
    credentials: Credentials,
    session: Option<Session>,
}

impl Bluesky<XrpcService> {
    /// Creates a new client that talks to the agent named in `settings`
    /// over HTTPS.
    ///
    /// Returns [`Error::CredentialsNotConfigured`] if `settings` has no
    /// credentials.
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        Self::check_credentials(settings)?;
        let service = XrpcService::new()?;
        Self::new_with_service(settings, service)
    }
}

impl<S: Service> Bluesky<S> {
    /// Creates a new client that sends its requests through `service`.
    ///
    /// Returns [`Error::CredentialsNotConfigured`] if `settings` has no
    /// credentials. Nothing is ever sent through `service` in that case.
    pub fn new_with_service(settings: &Settings, service: S) -> Result<Self, Error> {
        let credentials = Self::check_credentials(settings)?.clone();
        Ok(Self {
            service,
            clock: SystemClock,
            retry: RetryPolicy::default(),
            agent: settings.agent().to_string(),
            credentials,
            session: None,
        })
    }

    fn check_credentials(settings: &Settings) -> Result<&Credentials, Error> {
        settings
            .credentials()
            .ok_or(Error::CredentialsNotConfigured)
    }
}

impl<S: Service, C: Clock> Bluesky<S, C> {
    const CREATE_SESSION: &'static str = "com.atproto.server.createSession";
    const UPLOAD_BLOB: &'static str = "com.atproto.repo.uploadBlob";
    const CREATE_RECORD: &'static str = "com.atproto.repo.createRecord";

    /// Uses `clock` to timestamp posts.
    pub fn with_clock<D: Clock>(self, clock: D) -> Bluesky<S, D> {
        Bluesky {
            service: self.service,
            clock,
            retry: self.retry,
            agent: self.agent,
            credentials: self.credentials,
            session: self.session,
        }
    }

    /// Uses `retry` to decide how timed-out calls are retried.
    pub fn with_retry_policy(self, retry: RetryPolicy) -> Self {
        Self { retry, ..self }
    }

    /// The current session, if the client has logged in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn require_session(&self) -> Result<&Session, Error> {
        self.session.as_ref().ok_or(Error::Unauthenticated)
    }

    fn uri(&self, resource: &str) -> String {
        format!("{}/xrpc/{resource}", self.agent)
    }

    /// Logs in and stores the session for later calls.
    ///
    /// Returns [`Error::Remote`] if the agent rejects the credentials, in
    /// which case the client stays logged out.
    pub async fn auth(&mut self) -> Result<(), Error> {
        let body = serde_json::to_value(&self.credentials).map_err(HTTPError::Serialization)?;
        let request = Request::new(self.uri(Self::CREATE_SESSION), Body::Json(body));
        let resp = self.service.post(request).await?;
        let session: SessionResponse = Self::expect_ok(resp)?.json()?;

        info!("logged in to {} as {}", self.agent, session.handle);
        self.session = Some(Session::from(session));
        Ok(())
    }

    /// Sends an authorized request to the XRPC `resource`.
    ///
    /// `headers` are sent along with the request, except that any
    /// `Authorization` header is replaced with the session's bearer token.
    /// Requests that time out are retried according to the client's
    /// [retry policy](RetryPolicy); any other error is returned
    /// immediately.
    ///
    /// The response is returned regardless of its status. It is up to the
    /// caller to check it.
    pub async fn xrpc(
        &self,
        resource: &str,
        headers: HeaderMap,
        body: Body,
    ) -> Result<Response, Error> {
        let session = self.require_session()?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", session.access_jwt))
            .map_err(HTTPError::from)?;
        let request = Request::new(self.uri(resource), body)
            .headers(headers)
            .header(header::AUTHORIZATION, bearer);

        debug!("calling {resource}");
        let resp = self
            .retry
            .run(|| self.service.post(request.clone()))
            .await?;
        Ok(resp)
    }

    /// Uploads `media` and returns it as an image that can be embedded in
    /// a post.
    pub async fn upload(&self, media: &Media) -> Result<Image, Error> {
        let mut headers = HeaderMap::new();
        let content_type = HeaderValue::from_str(media.mime()).map_err(HTTPError::from)?;
        headers.insert(header::CONTENT_TYPE, content_type);
        let body = Body::Bytes(media.content().to_vec());

        let resp = self.xrpc(Self::UPLOAD_BLOB, headers, body).await?;
        let upload: UploadBlobResponse = Self::expect_ok(resp)?.json()?;
        debug!("uploaded {} bytes of {}", media.content().len(), media.mime());

        Ok(Image {
            alt: media.alt().unwrap_or_default().to_string(),
            image: upload.blob,
        })
    }

    /// Builds the body of the request that creates `post`.
    ///
    /// Any media attached to the post are uploaded first, all at once. The
    /// images are embedded in the same order as the post's media, however
    /// long each upload takes. If any upload fails, the first failure (in
    /// the order of the post's media) is returned, but the other uploads
    /// are still allowed to finish.
    pub async fn data(&self, post: &Post) -> Result<CreateRecord, Error> {
        let session = self.require_session()?;

        let uploads = post.attachments().iter().map(|media| self.upload(media));
        let images = join_all(uploads)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let record = PostRecord::new(post.text(), self.clock.timestamp(), post.language())
            .facets(facet::links(post.text()))
            .images(images);
        Ok(CreateRecord::post(session.did(), record))
    }

    /// The public URL of the post created by `resp`.
    pub fn url_from(&self, resp: &Response) -> Result<String, Error> {
        let session = self.require_session()?;
        let record: CreateRecordResponse = resp.json()?;
        let post_id = record.uri.rsplit('/').next().unwrap_or_default();
        Ok(format!(
            "https://bsky.app/profile/{}/post/{post_id}",
            session.handle()
        ))
    }

    /// Publishes `post` and returns its public URL.
    pub async fn post(&self, post: &Post) -> Result<String, Error> {
        let data = self.data(post).await?;
        let body = serde_json::to_value(&data).map_err(HTTPError::Serialization)?;
        let resp = self
            .xrpc(Self::CREATE_RECORD, HeaderMap::new(), Body::Json(body))
            .await?;
        let url = self.url_from(&Self::expect_ok(resp)?)?;
        info!("published {url}");
        Ok(url)
    }

    fn expect_ok(resp: Response) -> Result<Response, Error> {
        if resp.status() == StatusCode::OK {
            Ok(resp)
        } else {
            Err(Error::Remote(RemoteServiceError::from(&resp)))
        }
    }
}

/// An error returned by a Bluesky agent.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteServiceError {
    status: StatusCode,
    error: String,
    message: Option<String>,
}

impl RemoteServiceError {
    /// The HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The error code, such as `AuthenticationRequired`.
    ///
    /// If the agent did not send a structured error, this is the raw body
    /// of the response.
    pub fn error(&self) -> &str {
        &self.error
    }

    /// A human-readable description of the error, if the agent sent one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<&Response> for RemoteServiceError {
    fn from(resp: &Response) -> Self {
        let status = resp.status();
        match resp.json::<ErrorResponse>() {
            Ok(body) => Self {
                status,
                error: body.error,
                message: body.message,
            },
            Err(_) => Self {
                status,
                error: resp.text().trim().to_string(),
                message: None,
            },
        }
    }
}

impl fmt::Display for RemoteServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error from Bluesky agent/instance - [HTTP Status {}] {}",
            self.status.as_u16(),
            self.error
        )?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteServiceError {}

/// A client error.
#[derive(Debug, Error)]
pub enum Error {
    /// The client was created without credentials.
    #[error(
        "{} and/or {} environment variables not set",
        conf::IDENTIFIER_VAR,
        conf::PASSWORD_VAR
    )]
    CredentialsNotConfigured,

    /// A call that needs a session was made before logging in.
    #[error("Not logged in to Bluesky")]
    Unauthenticated,

    /// The Bluesky agent returned an unsuccessful response.
    #[error(transparent)]
    Remote(#[from] RemoteServiceError),

    /// An error from the underlying HTTP service.
    #[error("Service error: {0}")]
    Service(#[from] HTTPError),
}
