use std::borrow::Cow;
use std::sync::OnceLock;

use bytes::Bytes;
use sonic_rs::{JsonValueTrait, Value};

use crate::adapter::{RestError, RestErrorKind, RestResponse};

/// Status reported when no HTTP exchange took place.
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

/// Metadata describing how a request ended.
///
/// `body` is only set when the transport captured an error body instead of
/// handing back a response; `msg` is only set for transport-level failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseInfo {
    pub url: String,
    pub status: i32,
    pub msg: Option<String>,
    pub body: Option<String>,
}

impl ResponseInfo {
    pub fn new(url: impl Into<String>, status: i32) -> Self {
        Self {
            url: url.into(),
            status,
            msg: None,
            body: None,
        }
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug)]
pub struct Response {
    body: Option<Bytes>,
    info: ResponseInfo,
    json: OnceLock<Option<Value>>,
}

impl Response {
    pub fn new(body: Option<Bytes>, info: ResponseInfo) -> Self {
        Self {
            body,
            info,
            json: OnceLock::new(),
        }
    }

    pub fn from_rest_response(url: impl Into<String>, response: RestResponse) -> Self {
        let info = ResponseInfo::new(url, i32::from(response.status));
        Self::new(Some(response.body), info)
    }

    pub fn from_rest_error(url: impl Into<String>, error: RestError) -> Self {
        let info = match (error.kind, error.status) {
            (RestErrorKind::Rejected, Some(status)) => {
                ResponseInfo::new(url, i32::from(status)).with_body(error.message)
            }
            (_, status) => ResponseInfo::new(
                url,
                status.map_or(TRANSPORT_FAILURE_STATUS, i32::from),
            )
            .with_msg(format!("Request failed: {}", error.message)),
        };
        Self::new(None, info)
    }

    /// Raw body, `None` when the transport produced no response.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn info(&self) -> &ResponseInfo {
        &self.info
    }

    pub fn status_code(&self) -> i32 {
        self.info.status
    }

    /// Parsed body, computed on first access.
    ///
    /// An absent or empty body falls back to the error body captured in
    /// [`ResponseInfo`]. Malformed JSON in either place yields `None`.
    pub fn json(&self) -> Option<&Value> {
        self.json
            .get_or_init(|| match self.body.as_deref() {
                Some(body) if !body.is_empty() => sonic_rs::from_slice(body).ok(),
                _ => self
                    .info
                    .body
                    .as_deref()
                    .and_then(|body| sonic_rs::from_str(body).ok()),
            })
            .as_ref()
    }

    /// The API's own `message` field, when the body is a JSON object carrying one.
    /// Non-string values are rendered as JSON text.
    pub fn api_message(&self) -> Option<Cow<'_, str>> {
        let message = self.json()?.get("message")?;
        match message.as_str() {
            Some(text) => Some(Cow::Borrowed(text)),
            None => sonic_rs::to_string(message).ok().map(Cow::Owned),
        }
    }
}
