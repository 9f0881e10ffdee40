//! The outbound call facade.
//!
//! [`Courier`] is built once from a [`Config`] and holds everything calls
//! share: the remote registry, the timeout policy, the pooled transport
//! and, when enabled, the call counters. None of it changes after
//! construction. Each logical call gets its own [`Client`] from
//! [`Courier::client`], configures it, and spends it on exactly one verb:
//!
//! ```no_run
//! # async fn demo(courier: courier::client::Courier) {
//! let response = courier
//!     .client()
//!     .header("authorization", "Bearer t0ken")
//!     .get("users", "/users/42", &[("fields", "name")])
//!     .await;
//! if response.is_unreachable() {
//!     // upstream down
//! }
//! # }
//! ```

pub mod params;
pub mod registry;
pub mod request;
pub mod response;
pub mod stats;
pub mod timeout;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::Serialize;
use tokio::sync::watch;
use tracing::Instrument;

use crate::config::model::{Config, DEFAULT_TIMEOUT_MS};
use crate::error::CourierError;

pub use params::Params;
pub use registry::RemoteRegistry;
pub use request::{PendingRequest, Verb};
pub use response::Response;
pub use stats::StatsSnapshot;
pub use timeout::TimeoutPolicy;
pub use transport::Transport;

use request::{Dispatch, CORRELATION_ID_HEADER};
use stats::Stats;

#[derive(Debug)]
struct Shared {
    registry: RemoteRegistry,
    timeouts: TimeoutPolicy,
    transport: Transport,
    stats: Option<Stats>,
    debug: bool,
}

/// Entry point shared across calls. Cloning is a refcount bump.
#[derive(Debug, Clone)]
pub struct Courier {
    shared: Arc<Shared>,
}

impl Courier {
    pub fn new(config: Config) -> Result<Self, CourierError> {
        Ok(Self::with_transport(config, Transport::new()?))
    }

    fn with_transport(config: Config, transport: Transport) -> Self {
        let Config {
            debug,
            enable_metrics,
            remotes,
            http_timeout,
        } = config;

        let shared = Shared {
            registry: RemoteRegistry::new(remotes),
            timeouts: TimeoutPolicy::new(http_timeout),
            transport,
            stats: enable_metrics.then(Stats::new),
            debug,
        };

        tracing::debug!(
            remotes = shared.registry.len(),
            debug = shared.debug,
            metrics = enable_metrics,
            "courier ready"
        );

        Self {
            shared: Arc::new(shared),
        }
    }

    /// A fresh facade for one logical call.
    #[must_use]
    pub fn client(&self) -> Client {
        Client {
            shared: Arc::clone(&self.shared),
            headers: HeaderMap::new(),
            timeout: None,
            query: Vec::new(),
            insecure_skip_verify: false,
            correlation_id: None,
            cancel: None,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &RemoteRegistry {
        &self.shared.registry
    }

    #[must_use]
    pub fn timeouts(&self) -> &TimeoutPolicy {
        &self.shared.timeouts
    }

    /// Counters since construction, or `None` when metrics are disabled.
    #[must_use]
    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.shared.stats.as_ref().map(Stats::snapshot)
    }
}

/// Single-use call facade: set headers, timeout and TLS policy, then spend
/// it on one verb.
#[derive(Debug)]
pub struct Client {
    shared: Arc<Shared>,
    headers: HeaderMap,
    timeout: Option<Duration>,
    query: Vec<(String, String)>,
    insecure_skip_verify: bool,
    correlation_id: Option<String>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Client {
    /// Replace the whole header set. Names or values that are not valid
    /// HTTP are skipped with a warning.
    #[must_use]
    pub fn set_header<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.headers.clear();
        for (name, values) in headers {
            for value in values {
                self = self.header(name.as_ref(), value.as_ref());
            }
        }
        self
    }

    /// Append one header value.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (name.parse::<HeaderName>(), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => {
                tracing::warn!(header = %name, "invalid header name or value, skipping");
            }
        }
        self
    }

    /// Deadline used when the timeout policy has no entry for the call's
    /// remote and path. Configured entries still take precedence.
    #[must_use]
    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Append a query pair, whatever the verb.
    #[must_use]
    pub fn add_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Accept any server certificate, for this call only.
    #[must_use]
    pub fn insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    /// Propagate an existing correlation id instead of generating one.
    #[must_use]
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Abort the call as soon as `cancel` turns `true`. An aborted call is
    /// reported like a timeout.
    #[must_use]
    pub fn cancel_on(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub async fn get<P: Serialize + ?Sized>(self, remote: &str, path: &str, query: &P) -> Response {
        self.call(Verb::Get, remote, path, Params::capture(query)).await
    }

    pub async fn post<P: Serialize + ?Sized>(self, remote: &str, path: &str, form: &P) -> Response {
        self.call(Verb::Post, remote, path, Params::capture(form)).await
    }

    pub async fn post_url_encode<P: Serialize + ?Sized>(
        self,
        remote: &str,
        path: &str,
        form: &P,
    ) -> Response {
        self.call(Verb::PostUrlEncode, remote, path, Params::capture(form))
            .await
    }

    pub async fn put<P: Serialize + ?Sized>(self, remote: &str, path: &str, form: &P) -> Response {
        self.call(Verb::Put, remote, path, Params::capture(form)).await
    }

    pub async fn post_json<P: Serialize + ?Sized>(
        self,
        remote: &str,
        path: &str,
        json: &P,
    ) -> Response {
        self.call(Verb::PostJson, remote, path, Params::capture(json))
            .await
    }

    pub async fn delete<P: Serialize + ?Sized>(self, remote: &str, path: &str, form: &P) -> Response {
        self.call(Verb::Delete, remote, path, Params::capture(form)).await
    }

    /// Dispatch `verb` with already captured parameters.
    pub async fn call(mut self, verb: Verb, remote: &str, path: &str, params: Params) -> Response {
        let shared = Arc::clone(&self.shared);
        let correlation_id = self
            .correlation_id
            .take()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        match HeaderValue::from_str(&correlation_id) {
            Ok(value) => {
                self.headers.insert(CORRELATION_ID_HEADER, value);
            }
            Err(_) => {
                tracing::warn!(correlation_id = %correlation_id, "correlation id is not a valid header value");
            }
        }

        let fallback = self
            .timeout
            .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS));

        let mut request = PendingRequest::new();
        request
            .select_remote(&shared.registry, remote)
            .set_path(path)
            .resolve_timeout(&shared.timeouts, remote, path, fallback)
            .set_headers(self.headers)
            .set_query(self.query)
            .set_insecure_skip_verify(self.insecure_skip_verify);

        let dispatch = Dispatch {
            transport: &shared.transport,
            stats: shared.stats.as_ref(),
            debug: shared.debug,
            cancel: self.cancel,
        };

        let span = tracing::info_span!(
            "remote_call",
            verb = %verb,
            remote = %remote,
            path = %path,
            correlation_id = %correlation_id,
        );

        request.send(verb, params, dispatch).instrument(span).await
    }
}
