//! HTTP transport collaborator.
//!
//! The dispatch engine never performs I/O itself. Every entry point on
//! [`AsyncHttpClient`](crate::AsyncHttpClient) builds a blocking call against a
//! [`Transport`] and hands it to the engine. Timeouts belong here, not in the
//! engine.

use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::Outcome;

/// Response handed to callbacks.
pub type Response = ureq::http::Response<ureq::Body>;

/// Prepared request for [`Transport::send`].
pub type Request = ureq::http::Request<Vec<u8>>;

/// Blocking HTTP operations. Implementations must be safe to call from many
/// dispatched threads at once; the engine adds no locking around them.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<Response, ureq::Error>;

    fn head(&self, url: &str) -> Result<Response, ureq::Error>;

    fn post(&self, url: &str, content_type: &str, body: &[u8]) -> Result<Response, ureq::Error>;

    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<Response, ureq::Error>;

    fn send(&self, request: Request) -> Result<Response, ureq::Error>;
}

/// Default transport backed by a shared `ureq` agent.
///
/// Non-2xx statuses are returned as responses, not errors: deciding what a 404
/// means is the caller's business.
pub struct HttpTransport {
    agent: ureq::Agent,
    user_agent: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();

        Self {
            agent,
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Response, ureq::Error> {
        self.agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
    }

    fn head(&self, url: &str) -> Result<Response, ureq::Error> {
        self.agent
            .head(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
    }

    fn post(&self, url: &str, content_type: &str, body: &[u8]) -> Result<Response, ureq::Error> {
        self.agent
            .post(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Content-Type", content_type)
            .send(body)
    }

    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<Response, ureq::Error> {
        self.agent
            .post(url)
            .header("User-Agent", self.user_agent.as_str())
            .send_form(form.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn send(&self, mut request: Request) -> Result<Response, ureq::Error> {
        if !request.headers().contains_key(ureq::http::header::USER_AGENT)
            && let Ok(value) = ureq::http::HeaderValue::from_str(&self.user_agent)
        {
            request
                .headers_mut()
                .insert(ureq::http::header::USER_AGENT, value);
        }
        self.agent.run(request)
    }
}

/// Read a response body to a string.
pub fn read_body(response: &mut Response) -> Outcome<String> {
    Ok(response.body_mut().read_to_string()?)
}
