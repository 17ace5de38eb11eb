use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use super::{ClientError, Credentials, Transport};

const BROWSE_URL: &str = "https://music.youtube.com/youtubei/v1/browse";
const QUEUE_URL: &str = "https://music.youtube.com/youtubei/v1/music/get_queue";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured headers that must not be replayed verbatim.
const SKIPPED_HEADERS: &[&str] = &["content-length", "accept-encoding", "host"];

/// Blocking client replaying a captured browser session.
pub struct SyncClient {
    client: Client,
    credentials: Credentials,
    headers: HeaderMap,
}

impl SyncClient {
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        let headers = header_map(&credentials);
        Ok(Self {
            client,
            credentials,
            headers,
        })
    }
}

impl Transport for SyncClient {
    fn send_request(&self, payload: &Map<String, Value>) -> Result<Value, ClientError> {
        let endpoint = route(payload)?;
        let body = request_body(&self.credentials, payload);
        tracing::debug!(endpoint, ?payload, "sending request");

        let url = reqwest::Url::parse_with_params(endpoint, &self.credentials.params)
            .map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .json(&body)
            .send()?;

        let status = response.status();
        match status.as_u16() {
            200 => Ok(response.json()?),
            401 => Err(ClientError::Unauthorized),
            code => {
                tracing::warn!(endpoint, status = code, "request failed");
                Err(ClientError::Status(code))
            }
        }
    }
}

/// Picks the API endpoint from the payload's shape.
pub fn route(payload: &Map<String, Value>) -> Result<&'static str, ClientError> {
    if payload.contains_key("browse_id") || payload.contains_key("browseId") {
        Ok(BROWSE_URL)
    } else if payload.contains_key("playlistId") || payload.contains_key("videoId") {
        Ok(QUEUE_URL)
    } else {
        Err(ClientError::UnknownPayload(
            payload.keys().cloned().collect::<Vec<_>>().join(", "),
        ))
    }
}

/// Captured JSON body with `payload` merged over it.
pub fn request_body(credentials: &Credentials, payload: &Map<String, Value>) -> Map<String, Value> {
    let mut body = credentials.json_data.clone();
    for (key, value) in payload {
        let key = if key == "browse_id" { "browseId" } else { key.as_str() };
        body.insert(key.to_string(), value.clone());
    }
    body
}

fn header_map(credentials: &Credentials) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, value) in &credentials.headers {
        if SKIPPED_HEADERS.contains(&key.as_str()) {
            continue;
        }
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %key, "dropping invalid captured header"),
        }
    }
    headers
}
