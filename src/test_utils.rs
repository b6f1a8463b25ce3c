use crate::bluesky::service::Service;
use crate::clock::{Clock, DateTime, Utc};
use crate::http::{Body, HTTPError, HTTPResult, Request, Response, StatusCode};
use crate::media::Prompt;
use reqwest::header;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes `content` to a uniquely named file in the temporary directory
/// and returns its path.
pub fn scratch_file(extension: &str, content: &[u8]) -> PathBuf {
    let name = format!("skypost-{}.{extension}", uuid::Uuid::new_v4());
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, content).expect("could not write scratch file");
    path
}

/// A deterministic stand-in for a Bluesky agent.
///
/// By default every call succeeds: sessions are created for any
/// credentials, uploaded blobs are echoed back as blob references, and new
/// records are always `at://did:plc:xyz/app.bsky.feed.post/abc123`.
/// Failures and delays can be scripted per resource or per upload.
#[derive(Default)]
pub struct TestService {
    requests: Mutex<Vec<Request>>,
    completed_uploads: Mutex<Vec<Vec<u8>>>,
    rejections: HashMap<String, (StatusCode, String)>,
    timeouts: Mutex<HashMap<String, u32>>,
    disconnects: HashSet<String>,
    rejected_uploads: HashSet<Vec<u8>>,
    upload_delays: HashMap<Vec<u8>, Duration>,
}

impl TestService {
    /// Answers every call to `resource` with `status` and `body`.
    pub fn reject(mut self, resource: &str, status: StatusCode, body: &str) -> Self {
        self.rejections
            .insert(resource.to_string(), (status, body.to_string()));
        self
    }

    /// Times out the first `times` calls to `resource`.
    pub fn time_out(self, resource: &str, times: u32) -> Self {
        self.timeouts
            .lock()
            .unwrap()
            .insert(resource.to_string(), times);
        self
    }

    /// Fails every call to `resource` without a response.
    pub fn disconnect(mut self, resource: &str) -> Self {
        self.disconnects.insert(resource.to_string());
        self
    }

    /// Rejects uploads of `content` as too large.
    pub fn reject_upload(mut self, content: &[u8]) -> Self {
        self.rejected_uploads.insert(content.to_vec());
        self
    }

    /// Waits `delay` before answering an upload of `content`.
    pub fn delay_upload(mut self, content: &[u8], delay: Duration) -> Self {
        self.upload_delays.insert(content.to_vec(), delay);
        self
    }

    /// The blob reference returned for an upload of `content`.
    pub fn blob(content: &[u8], mime: &str) -> serde_json::Value {
        json!({
            "$type": "blob",
            "ref": {"$link": String::from_utf8_lossy(content)},
            "mimeType": mime,
            "size": content.len(),
        })
    }

    /// Every request received so far, in the order they arrived.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Every request for `resource` received so far.
    pub fn requests_to(&self, resource: &str) -> Vec<Request> {
        let suffix = format!("/xrpc/{resource}");
        self.requests()
            .into_iter()
            .filter(|request| request.uri().ends_with(&suffix))
            .collect()
    }

    /// Content of every upload that has been answered, in the order the
    /// answers were sent.
    pub fn completed_uploads(&self) -> Vec<Vec<u8>> {
        self.completed_uploads.lock().unwrap().clone()
    }

    fn resource(request: &Request) -> String {
        request
            .uri()
            .rsplit_once("/xrpc/")
            .map(|(_, resource)| resource.to_string())
            .unwrap_or_default()
    }

    fn should_time_out(&self, resource: &str) -> bool {
        let mut timeouts = self.timeouts.lock().unwrap();
        match timeouts.get_mut(resource) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    fn create_session(request: &Request) -> Response {
        let identifier = match request.body() {
            Body::Json(body) => body["identifier"].as_str().unwrap_or_default().to_string(),
            Body::Bytes(_) => String::new(),
        };
        let body = json!({
            "accessJwt": format!("jwt-for-{identifier}"),
            "refreshJwt": "refresh",
            "did": "did:plc:xyz",
            "handle": "me.bsky.social",
        });
        Response::new(StatusCode::OK, body.to_string())
    }

    async fn upload_blob(&self, request: &Request) -> Response {
        let content = match request.body() {
            Body::Bytes(content) => content.clone(),
            Body::Json(_) => vec![],
        };
        let mime = request
            .header_value(header::CONTENT_TYPE)
            .unwrap_or("application/octet-stream")
            .to_string();

        if let Some(delay) = self.upload_delays.get(&content) {
            tokio::time::sleep(*delay).await;
        }

        let resp = if self.rejected_uploads.contains(&content) {
            let body = json!({"error": "BlobTooLarge", "message": "This file is too large"});
            Response::new(StatusCode::PAYLOAD_TOO_LARGE, body.to_string())
        } else {
            let body = json!({"blob": Self::blob(&content, &mime)});
            Response::new(StatusCode::OK, body.to_string())
        };
        self.completed_uploads.lock().unwrap().push(content);
        resp
    }

    fn create_record() -> Response {
        let body = json!({
            "uri": "at://did:plc:xyz/app.bsky.feed.post/abc123",
            "cid": "bafyreie5737gdxlw5i64vzichcalba3z2v5n6icifvx5xytvske7mr3hpm",
        });
        Response::new(StatusCode::OK, body.to_string())
    }
}

impl Service for TestService {
    async fn post(&self, request: Request) -> HTTPResult<Response> {
        self.requests.lock().unwrap().push(request.clone());
        let resource = Self::resource(&request);

        if self.disconnects.contains(&resource) {
            let err = reqwest::Client::new()
                .post("not a url")
                .build()
                .expect_err("an invalid URL should not build");
            return Err(HTTPError::Request(err));
        }

        if self.should_time_out(&resource) {
            return Err(HTTPError::Timeout(
                format!("{resource} timed out").into(),
            ));
        }

        if let Some((status, body)) = self.rejections.get(&resource) {
            return Ok(Response::new(*status, body.as_str()));
        }

        let resp = match resource.as_str() {
            "com.atproto.server.createSession" => Self::create_session(&request),
            "com.atproto.repo.uploadBlob" => self.upload_blob(&request).await,
            "com.atproto.repo.createRecord" => Self::create_record(),
            _ => Response::new(StatusCode::OK, "{}"),
        };
        Ok(resp)
    }
}

/// Answers questions from a script, and remembers what was asked.
///
/// Once the script runs out, every question fails.
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let answers: VecDeque<String> = answers.into_iter().map(Into::into).collect();
        Self {
            answers: Mutex::new(answers),
            questions: Mutex::new(vec![]),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str) -> io::Result<String> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more answers"))
    }
}

pub struct FrozenClock {
    datetime: DateTime<Utc>,
}

impl FrozenClock {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        FrozenClock { datetime }
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        let datetime = DateTime::parse_from_rfc3339("2025-05-23T10:13:00-07:00")
            .expect("invalid date supplied")
            .with_timezone(&Utc);
        Self::new(datetime)
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.datetime
    }
}
