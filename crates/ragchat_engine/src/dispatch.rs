use std::time::Duration;

use chat_logging::{chat_debug, chat_warn, redact};
use futures_util::StreamExt;
use ragchat_core::{ProgressSnapshot, RecommendEnvelope, SendEnvelope};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use url::Url;

use crate::codec::{decode_progress, decode_recommend, decode_send};
use crate::{TransportError, TransportErrorKind};

/// Forgery-protection token header, sent on every POST.
pub const CSRF_HEADER: &str = "x-csrftoken";
/// Marks the call as programmatic so the server answers with JSON.
pub const AJAX_HEADER: &str = "x-requested-with";
pub const AJAX_MARKER: &str = "XMLHttpRequest";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Relative endpoint paths are joined onto this.
    pub base_url: Url,
    pub csrf_token: String,
    /// Raw `Cookie` header value carrying the server session, if any.
    pub session_cookie: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl DispatchSettings {
    pub fn new(base_url: Url, csrf_token: impl Into<String>) -> Self {
        Self {
            base_url,
            csrf_token: csrf_token.into(),
            session_cookie: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 1024 * 1024,
        }
    }
}

/// The four calls the chat client makes. Never retries.
#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send_message(&self, url: &str, text: &str) -> Result<SendEnvelope, TransportError>;

    /// The response body is ignored; only transport failures count.
    async fn init_job(&self, url: &str) -> Result<(), TransportError>;

    async fn poll_job(&self, url: &str) -> Result<ProgressSnapshot, TransportError>;

    async fn finalize_job(&self, url: &str) -> Result<RecommendEnvelope, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestDispatcher {
    settings: DispatchSettings,
    client: reqwest::Client,
}

impl ReqwestDispatcher {
    pub fn new(settings: DispatchSettings) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(AJAX_HEADER, HeaderValue::from_static(AJAX_MARKER));
        if let Some(cookie) = settings.session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie).map_err(|err| {
                TransportError::new(TransportErrorKind::Network, format!("cookie header: {err}"))
            })?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| TransportError::new(TransportErrorKind::Network, err.to_string()))?;

        chat_debug!(
            "Dispatcher ready base_url={} csrf={}",
            settings.base_url,
            redact(&settings.csrf_token)
        );
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        self.settings
            .base_url
            .join(url)
            .map_err(|err| {
                TransportError::new(TransportErrorKind::InvalidUrl, format!("{url}: {err}"))
            })
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header(CSRF_HEADER, self.settings.csrf_token.as_str())
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, TransportError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        // Rejections arrive as JSON envelopes with error statuses; decode them anyway.
        let status = response.status();
        if !status.is_success() {
            chat_warn!("{} answered {}", response.url(), status);
        }

        self.read_body(response).await
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Dispatcher for ReqwestDispatcher {
    async fn send_message(&self, url: &str, text: &str) -> Result<SendEnvelope, TransportError> {
        let target = self.resolve(url)?;
        chat_debug!("POST send {} message_len={}", target, text.len());
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("action", "send")
            .append_pair("message", text)
            .finish();
        let request = self
            .post(target)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        let bytes = self.execute(request).await?;
        decode_send(&bytes)
    }

    async fn init_job(&self, url: &str) -> Result<(), TransportError> {
        let target = self.resolve(url)?;
        chat_debug!("POST job-init {}", target);
        self.execute(self.post(target)).await.map(|_| ())
    }

    async fn poll_job(&self, url: &str) -> Result<ProgressSnapshot, TransportError> {
        let target = self.resolve(url)?;
        chat_debug!("GET job-poll {}", target);
        let bytes = self.execute(self.client.get(target)).await?;
        decode_progress(&bytes)
    }

    async fn finalize_job(&self, url: &str) -> Result<RecommendEnvelope, TransportError> {
        let target = self.resolve(url)?;
        chat_debug!("POST job-finalize {}", target);
        let bytes = self.execute(self.post(target)).await?;
        decode_recommend(&bytes)
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> TransportError {
    TransportError::new(
        TransportErrorKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(TransportErrorKind::Timeout, err.to_string());
    }
    TransportError::new(TransportErrorKind::Network, err.to_string())
}
