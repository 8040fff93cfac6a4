//! Callback-style HTTP client.
//!
//! Each verb method wraps one blocking [`Transport`] call in an action and
//! hands it to the [`DispatchEngine`]. The methods return immediately; the
//! callback fires later on the dispatched thread with the response or the
//! failure.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::dispatch::{DispatchEngine, DispatchId};
use crate::error::Outcome;
use crate::transport::{HttpTransport, Request, Response, Transport};

pub struct AsyncHttpClient {
    transport: Arc<dyn Transport>,
    engine: DispatchEngine,
}

impl AsyncHttpClient {
    /// Client using the default [`HttpTransport`].
    pub fn new(config: ClientConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(&config));
        Self::with_transport(config, transport)
    }

    /// Client using a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let engine =
            DispatchEngine::new(config.concurrency).with_thread_name(config.thread_name.clone());
        tracing::debug!(concurrency = config.concurrency, "Async HTTP client created");

        Self { transport, engine }
    }

    pub fn concurrency(&self) -> usize {
        self.engine.concurrency()
    }

    /// Unissued tickets, or `None` when concurrency is unlimited.
    pub fn remaining_tickets(&self) -> Option<usize> {
        self.engine.tickets().map(|pool| pool.remaining())
    }

    pub fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    /// Run any blocking action under this client's concurrency limit.
    pub fn dispatch<T, A, C>(&self, action: A, callback: C) -> DispatchId
    where
        T: Send + 'static,
        A: FnOnce() -> Outcome<T> + Send + 'static,
        C: FnOnce(Outcome<T>) + Send + 'static,
    {
        self.engine.dispatch(action, callback)
    }

    pub fn get<C>(&self, url: impl Into<String>, callback: C) -> DispatchId
    where
        C: FnOnce(Outcome<Response>) + Send + 'static,
    {
        let url = url.into();
        let transport = Arc::clone(&self.transport);
        self.dispatch(move || Ok(transport.get(&url)?), callback)
    }

    pub fn head<C>(&self, url: impl Into<String>, callback: C) -> DispatchId
    where
        C: FnOnce(Outcome<Response>) + Send + 'static,
    {
        let url = url.into();
        let transport = Arc::clone(&self.transport);
        self.dispatch(move || Ok(transport.head(&url)?), callback)
    }

    pub fn post<C>(
        &self,
        url: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
        callback: C,
    ) -> DispatchId
    where
        C: FnOnce(Outcome<Response>) + Send + 'static,
    {
        let url = url.into();
        let content_type = content_type.into();
        let body = body.into();
        let transport = Arc::clone(&self.transport);
        self.dispatch(
            move || Ok(transport.post(&url, &content_type, &body)?),
            callback,
        )
    }

    pub fn post_form<C, K, V>(
        &self,
        url: impl Into<String>,
        form: impl IntoIterator<Item = (K, V)>,
        callback: C,
    ) -> DispatchId
    where
        C: FnOnce(Outcome<Response>) + Send + 'static,
        K: Into<String>,
        V: Into<String>,
    {
        let url = url.into();
        let form: Vec<(String, String)> = form
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let transport = Arc::clone(&self.transport);
        self.dispatch(move || Ok(transport.post_form(&url, &form)?), callback)
    }

    /// Send a prepared request.
    pub fn send<C>(&self, request: Request, callback: C) -> DispatchId
    where
        C: FnOnce(Outcome<Response>) + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        self.dispatch(move || Ok(transport.send(request)?), callback)
    }
}

impl Default for AsyncHttpClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
