use std::time::{Duration, Instant, SystemTime};

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Request, StatusCode};
use serde_json::Value;
use url::Url;

use crate::batch::TransferCode;
use crate::error::BatchError;
use crate::default_client;

/// One pending HTTP exchange, built by the caller and driven by a batch.
///
/// The handle buffers the whole response once the transfer concludes, so
/// callbacks can read status, headers and body without touching the network
/// again. Until then the accessors return `None`.
pub struct TransferHandle {
    client: Client,
    request: Option<Request>,
    method: Method,
    url: String,
    tag: Option<String>,
    started_at: Option<SystemTime>,
    elapsed: Option<Duration>,
    outcome: Option<Outcome>,
}

struct Outcome {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TransferHandle {
    /// Wraps a fully caller-built request.
    pub fn new(client: Client, request: Request) -> Self {
        let method = request.method().clone();
        let url = request.url().to_string();
        Self {
            client,
            request: Some(request),
            method,
            url,
            tag: None,
            started_at: None,
            elapsed: None,
            outcome: None,
        }
    }

    /// GET through the shared default client.
    pub fn get(url: &str) -> Result<Self, BatchError> {
        let url = Url::parse(url)?;
        Ok(Self::new(default_client().clone(), Request::new(Method::GET, url)))
    }

    /// Label carried into debug logs and readable from callbacks.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Transport deadline for this transfer alone. Expiry surfaces as
    /// [`TransferCode::OPERATION_TIMEDOUT`] on the failure path.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if let Some(request) = self.request.as_mut() {
            *request.timeout_mut() = Some(timeout);
        }
        self
    }

    // Drives this transfer to its terminal state. Consumes the pending
    // request; a handle is performed at most once per batch.
    pub(crate) async fn perform(&mut self) -> TransferCode {
        let request = match self.request.take() {
            Some(request) => request,
            None => return TransferCode::SEND_ERROR,
        };

        self.started_at = Some(SystemTime::now());
        let started = Instant::now();

        let code = match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                let headers = response.headers().clone();
                match response.bytes().await {
                    Ok(body) => {
                        self.outcome = Some(Outcome { status, headers, body });
                        TransferCode::OK
                    }
                    Err(err) if err.is_timeout() => TransferCode::OPERATION_TIMEDOUT,
                    Err(_) => TransferCode::PARTIAL_TRANSFER,
                }
            }
            Err(err) => TransferCode::from_transport(&err),
        };

        self.elapsed = Some(started.elapsed());
        code
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// HTTP status of the delivered response, if the transfer got that far.
    pub fn status(&self) -> Option<StatusCode> {
        self.outcome.as_ref().map(|outcome| outcome.status)
    }

    pub fn headers(&self) -> Option<&HeaderMap> {
        self.outcome.as_ref().map(|outcome| &outcome.headers)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.outcome.as_ref().map(|outcome| outcome.body.as_ref())
    }

    /// Moves the buffered body out of the handle.
    pub fn take_body(&mut self) -> Option<Bytes> {
        self.outcome.as_mut().map(|outcome| std::mem::take(&mut outcome.body))
    }

    pub fn text(&self) -> Option<String> {
        self.body().map(|body| String::from_utf8_lossy(body).into_owned())
    }

    /// Lenient JSON view of the body; `None` when there is no body or it
    /// does not parse.
    pub fn json(&self) -> Option<Value> {
        self.body().and_then(|body| serde_json::from_slice(body).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_rejects_unparsable_urls() {
        assert!(matches!(
            TransferHandle::get("not a url"),
            Err(BatchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn accessors_are_empty_before_the_transfer_runs() {
        let handle = TransferHandle::get("http://localhost/ping").unwrap();
        assert_eq!(handle.method(), &Method::GET);
        assert_eq!(handle.url(), "http://localhost/ping");
        assert!(handle.status().is_none());
        assert!(handle.headers().is_none());
        assert!(handle.body().is_none());
        assert!(handle.text().is_none());
        assert!(handle.elapsed().is_none());
    }

    #[test]
    fn tag_is_carried() {
        let handle = TransferHandle::get("http://localhost/").unwrap().with_tag("probe");
        assert_eq!(handle.tag(), Some("probe"));
    }
}
