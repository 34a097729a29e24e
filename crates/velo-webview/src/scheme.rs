//! Intercepted custom-scheme loads.
//!
//! Every request under the reserved scheme becomes one [`SchemeTask`]. The
//! web engine keeps that load paused until the task is finished, which may
//! happen on any thread and at any later time. `finish` consumes the task,
//! so a task can complete at most once.

use std::borrow::Cow;
use std::fmt;

use tracing::{debug, warn};
use velo_common::new_correlation_id;
use wry::http::header::CONTENT_TYPE;
use wry::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri};

/// Response delivered to the paused load.
pub type SchemeResponse = Response<Cow<'static, [u8]>>;

type Responder = Box<dyn FnOnce(SchemeResponse) + Send>;

/// Content type used when the host never sets one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One paused custom-scheme load and the response being assembled for it.
pub struct SchemeTask {
    id: String,
    request: Request<Vec<u8>>,
    status: u16,
    content_type: String,
    headers: String,
    body: Vec<u8>,
    responder: Option<Responder>,
}

impl SchemeTask {
    /// Wrap `request` and the continuation that resumes its load.
    pub fn new<F>(request: Request<Vec<u8>>, responder: F) -> Self
    where
        F: FnOnce(SchemeResponse) + Send + 'static,
    {
        Self {
            id: new_correlation_id(),
            request,
            status: 200,
            content_type: String::new(),
            headers: String::new(),
            body: Vec::new(),
            responder: Some(Box::new(responder)),
        }
    }

    /// Short id for correlating log lines.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn request(&self) -> &Request<Vec<u8>> {
        &self.request
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn url(&self) -> String {
        self.request.uri().to_string()
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Path component of the request URL, always starting with `/`.
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn headers(&self) -> &str {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replace the status line, content type and extra headers.
    ///
    /// `headers` is either a JSON object of name to value or
    /// newline-separated `Name: value` lines.
    pub fn set_response_meta(&mut self, status: u16, content_type: &str, headers: &str) {
        self.status = status;
        self.content_type = content_type.to_string();
        self.headers = headers.to_string();
    }

    pub fn append_data(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Deliver the assembled response and resume the paused load.
    pub fn finish(mut self) {
        let response = self.build_response();
        if let Some(respond) = self.responder.take() {
            debug!(
                task = %self.id,
                status = response.status().as_u16(),
                len = response.body().len(),
                "scheme task finished"
            );
            respond(response);
        }
    }

    fn build_response(&mut self) -> SchemeResponse {
        let status = StatusCode::from_u16(self.status).unwrap_or_else(|_| {
            warn!(task = %self.id, status = self.status, "invalid status code, sending 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut response = Response::new(Cow::Owned(std::mem::take(&mut self.body)));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in parse_headers(&self.headers) {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => debug!(task = %self.id, header = %name, "skipping malformed header"),
            }
        }
        set_content_type(headers, &self.content_type);
        response
    }
}

fn set_content_type(headers: &mut HeaderMap, content_type: &str) {
    let requested = if content_type.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        content_type
    };
    let value = HeaderValue::from_str(requested)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(CONTENT_TYPE, value);
}

/// A short `text/plain` response.
pub fn plain_response(status: StatusCode, text: &'static str) -> SchemeResponse {
    let mut response = Response::new(Cow::Borrowed(text.as_bytes()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Split a serialized header block into name/value pairs.
pub fn parse_headers(raw: &str) -> Vec<(String, String)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('{') {
        if let Ok(map) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(trimmed)
        {
            return map
                .into_iter()
                .map(|(name, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (name, value)
                })
                .collect();
        }
    }

    trimmed
        .lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

impl Drop for SchemeTask {
    fn drop(&mut self) {
        if let Some(respond) = self.responder.take() {
            warn!(task = %self.id, url = %self.request.uri(), "scheme task dropped unfinished, sending 500");
            respond(plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "request abandoned",
            ));
        }
    }
}

impl fmt::Debug for SchemeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeTask")
            .field("id", &self.id)
            .field("url", &self.request.uri())
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

/// Whether `url` targets `scheme`, either directly (`velo://...`) or in the
/// `http://velo.localhost/...` form WebView2 uses for custom schemes.
pub fn matches_scheme(url: &str, scheme: &str) -> bool {
    if scheme.is_empty() {
        return false;
    }
    if let Some(rest) = url.strip_prefix(scheme) {
        if rest.starts_with(':') {
            return true;
        }
    }
    ["http://", "https://"].iter().any(|prefix| {
        url.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(scheme))
            .and_then(|rest| rest.strip_prefix(".localhost"))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#', ':']))
    })
}

/// Rewrite `scheme://localhost/...` into the `http://scheme.localhost/...`
/// form WebView2 serves custom protocols under. Other URLs are returned
/// unchanged.
pub fn webview2_url(url: &str, scheme: &str) -> String {
    let Some(rest) = url
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://"))
    else {
        return url.to_string();
    };
    let path = rest.strip_prefix("localhost").unwrap_or(rest);
    let path = path.trim_start_matches('/');
    format!("http://{scheme}.localhost/{path}")
}

/// The URL to hand the engine on this platform.
pub fn platform_url(url: &str, scheme: &str) -> String {
    if cfg!(windows) {
        webview2_url(url, scheme)
    } else {
        url.to_string()
    }
}
