//! Client configuration.

use std::time::Duration;

use crate::dispatch::DEFAULT_THREAD_NAME;
use crate::version::default_user_agent;

/// Construction-time settings for [`AsyncHttpClient`](crate::AsyncHttpClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Max actions running at the same time. Zero means unlimited.
    pub concurrency: usize,
    /// Per-request timeout enforced by the default transport.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Name given to every dispatched thread.
    pub thread_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            concurrency: std::env::var("ASYNCHTTP_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(0),
            timeout: std::env::var("ASYNCHTTP_TIMEOUT")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .map(Duration::from_secs_f64),
            user_agent: default_user_agent(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn is_unlimited(&self) -> bool {
        self.concurrency == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_pattern() {
        let config = ClientConfig {
            concurrency: 0,
            timeout: None,
            ..ClientConfig::default()
        }
        .with_concurrency(4)
        .with_timeout(Duration::from_millis(200))
        .with_user_agent("fetcher/1.0")
        .with_thread_name("fetcher");

        assert_eq!(config.concurrency, 4);
        assert!(!config.is_unlimited());
        assert_eq!(config.timeout, Some(Duration::from_millis(200)));
        assert_eq!(config.user_agent, "fetcher/1.0");
        assert_eq!(config.thread_name, "fetcher");
    }

    #[test]
    fn zero_concurrency_is_unlimited() {
        let config = ClientConfig::default().with_concurrency(0);
        assert!(config.is_unlimited());
    }

    #[test]
    fn defaults_identify_the_crate() {
        let config = ClientConfig::default();
        assert!(config.user_agent.starts_with("asynchttp/"));
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
        assert_eq!(config.thread_name, "asynchttp-dispatch");
    }
}
