//! Request dispatcher: asynchronous execution over the transport envelope.
//!
//! One dispatcher per session. Requests are independent; no ordering is
//! guaranteed between concurrently issued calls, even to the same path.
//! Callers needing ordering await one call before issuing the next.

use crate::{
    config::SessionConfig,
    envelope,
    transport::{self, Outcome},
    Error, Result,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Executes authenticated API calls for one session.
///
/// Owns the HTTP client and the immutable session configuration; shared
/// read-only across all in-flight requests.
pub struct Dispatcher {
    config: Arc<SessionConfig>,
    client: reqwest::Client,
}

impl Dispatcher {
    /// Dispatcher over the given configuration
    pub fn new(config: SessionConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Session configuration this dispatcher was built with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Call expecting a single object.
    ///
    /// `Ok(None)` encodes absence: the server answered 404, or answered
    /// 2xx with an empty body. Lookups by ID are "value or absence", not
    /// "value or failure".
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<T>> {
        match transport::send(&self.client, &self.config, method, path, body.as_ref()).await? {
            Outcome::Missing => Ok(None),
            Outcome::Success(bytes) if bytes.is_empty() => Ok(None),
            Outcome::Success(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        }
    }

    /// Call with no expected response value; any 2xx body is discarded.
    pub async fn call_void(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<()> {
        transport::send(&self.client, &self.config, method, path, body.as_ref())
            .await
            .map(|_| ())
    }

    /// Call expecting a `{ "<key>": [...] }` envelope, unwrapped to a plain
    /// ordered sequence. Absence decodes to an empty list.
    pub async fn call_list<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        key: &str,
    ) -> Result<Vec<T>> {
        match transport::send(&self.client, &self.config, method, path, body.as_ref()).await? {
            Outcome::Missing => Ok(Vec::new()),
            Outcome::Success(bytes) => envelope::unwrap_list(&bytes, key),
        }
    }

    /// Spawned variant of [`call`](Self::call): the request runs on the
    /// runtime and the result is delivered exactly once through the
    /// returned handle.
    pub fn dispatch<T>(&self, method: Method, path: &str, body: Option<Value>) -> InFlight<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let config = Arc::clone(&self.config);
        let path = path.to_string();
        let handle = tokio::spawn(async move {
            match transport::send(&client, &config, method, &path, body.as_ref()).await? {
                Outcome::Missing => Ok(None),
                Outcome::Success(bytes) if bytes.is_empty() => Ok(None),
                Outcome::Success(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            }
        });
        InFlight { handle }
    }
}

/// Handle to one dispatched request.
///
/// Exactly one of success or error is delivered, through [`wait`]. A
/// cancelled request delivers neither: [`cancel`] consumes the handle and
/// aborts the underlying I/O. Dropping the handle without awaiting lets
/// the request run to completion unobserved.
///
/// [`wait`]: InFlight::wait
/// [`cancel`]: InFlight::cancel
pub struct InFlight<T> {
    handle: JoinHandle<Result<Option<T>>>,
}

impl<T> InFlight<T> {
    /// Await the result of the request
    pub async fn wait(self) -> Result<Option<T>> {
        match self.handle.await {
            Ok(result) => result,
            Err(join_error) => Err(Error::transport(join_error)),
        }
    }

    /// Cancel the request, aborting the underlying I/O. Neither a success
    /// nor an error will ever be delivered for it.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl<T> std::fmt::Debug for InFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}
