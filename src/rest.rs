use std::time::Duration;

use sonic_rs::Value;
use tracing::{debug, warn};

use crate::adapter::{Client, Method, RestRequest};
use crate::response::{Response, ResponseInfo, TRANSPORT_FAILURE_STATUS};

pub const DEFAULT_BASE_URL: &str = "https://api.digitalocean.com/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const RATELIMIT_REMAINING_HEADER: &str = "ratelimit-remaining";

/// Thin DigitalOcean API client: a base URL, a set of default headers and
/// one `send` that always hands back a [`Response`].
#[derive(Clone)]
pub struct Rest {
    client: Client,
    base_url: String,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl Rest {
    pub fn new(client: Client, headers: Vec<(String, String)>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            headers,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    pub fn with_bearer_token(client: Client, token: &str) -> Self {
        Self::new(
            client,
            vec![
                ("Authorization".to_string(), format!("Bearer {token}")),
                ("Content-type".to_string(), "application/json".to_string()),
            ],
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn url_for(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.base_url, path)
    }

    fn merged_headers(&self, overrides: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut merged = self.headers.clone();
        for (name, value) in overrides {
            match merged
                .iter_mut()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            {
                Some(slot) => slot.1 = (*value).to_string(),
                None => merged.push(((*name).to_string(), (*value).to_string())),
            }
        }
        merged
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        data: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let url = self.url_for(path);
        let mut request = RestRequest::new(method.clone(), url.clone());
        for (name, value) in self.merged_headers(headers) {
            request = request.with_header(name, value);
        }
        if let Some(data) = data {
            match sonic_rs::to_vec(data) {
                Ok(body) => request = request.with_body(body),
                Err(err) => {
                    warn!(%method, %url, error = %err, "failed to encode request body");
                    let info = ResponseInfo::new(url, TRANSPORT_FAILURE_STATUS)
                        .with_msg(format!("Failed to encode request body: {err}"));
                    return Response::new(None, info);
                }
            }
        }
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout);
        }

        debug!(%method, %url, "sending request");
        match self.client.execute(request).await {
            Ok(response) => {
                debug!(
                    %method,
                    %url,
                    status = response.status,
                    elapsed_ms = response.elapsed.as_millis() as u64,
                    ratelimit_remaining = response.header(RATELIMIT_REMAINING_HEADER),
                    "received response"
                );
                Response::from_rest_response(url, response)
            }
            Err(err) => {
                warn!(%method, %url, kind = ?err.kind, status = ?err.status, "request failed");
                Response::from_rest_error(url, err)
            }
        }
    }

    pub async fn get(&self, path: &str, data: Option<&Value>, headers: &[(&str, &str)]) -> Response {
        self.send(Method::GET, path, data, headers).await
    }

    pub async fn put(&self, path: &str, data: Option<&Value>, headers: &[(&str, &str)]) -> Response {
        self.send(Method::PUT, path, data, headers).await
    }

    pub async fn post(&self, path: &str, data: Option<&Value>, headers: &[(&str, &str)]) -> Response {
        self.send(Method::POST, path, data, headers).await
    }

    pub async fn delete(
        &self,
        path: &str,
        data: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        self.send(Method::DELETE, path, data, headers).await
    }
}
