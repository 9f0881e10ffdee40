//! Per-call request state and verb execution.
//!
//! A [`PendingRequest`] is created for one call, filled in by the facade
//! (remote, path, timeout, headers, TLS choice) and consumed by
//! [`PendingRequest::send`]. It is never shared between calls.
//!
//! Sending has a single suspension point: the exchange with the upstream,
//! bounded by the resolved timeout and optionally by a caller cancellation
//! signal. Every outcome becomes a [`Response`]:
//!
//! - upstream answered: its status and body
//! - POST-JSON payload could not be encoded: [`FAILURE_BODY`] with 406,
//!   nothing sent
//! - anything else: [`FAILURE_BODY`] with the default 502, after one
//!   error event naming the remote and the parameters

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, Method, StatusCode};
use http_body_util::{BodyExt, Full};
use tokio::sync::watch;
use url::Url;

use super::params::Params;
use super::registry::RemoteRegistry;
use super::response::{Response, FAILURE_BODY};
use super::stats::Stats;
use super::timeout::TimeoutPolicy;
use super::transport::Transport;
use crate::error::EncodeError;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    PostUrlEncode,
    Put,
    PostJson,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Query,
    Form,
    Json,
}

impl Verb {
    pub const ALL: [Self; 6] = [
        Self::Get,
        Self::Post,
        Self::PostUrlEncode,
        Self::Put,
        Self::PostJson,
        Self::Delete,
    ];

    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post | Self::PostUrlEncode | Self::PostJson => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }

    const fn encoding(self) -> Encoding {
        match self {
            Self::Get => Encoding::Query,
            Self::Post | Self::PostUrlEncode | Self::Put | Self::Delete => Encoding::Form,
            Self::PostJson => Encoding::Json,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
            Self::PostUrlEncode => "PostUrlEncode",
            Self::Put => "Put",
            Self::PostJson => "PostJson",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a call produced no upstream response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to build request: {0}")]
    Build(#[from] http::Error),

    #[error("request failed: {0}")]
    Connect(#[from] hyper_util::client::legacy::Error),

    #[error("body read error: {0}")]
    Body(#[from] hyper::Error),

    #[error("request timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("request cancelled by caller")]
    Cancelled,
}

/// Shared collaborators a call borrows while it is sent.
pub(crate) struct Dispatch<'a> {
    pub transport: &'a Transport,
    pub stats: Option<&'a Stats>,
    pub debug: bool,
    pub cancel: Option<watch::Receiver<bool>>,
}

#[derive(Debug, Clone, Default)]
pub struct PendingRequest {
    name: String,
    remote: String,
    url: String,
    timeout: Duration,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    insecure_skip_verify: bool,
}

impl PendingRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick a physical address for `name`. Unknown names leave the remote
    /// empty; the call then fails at send time like any unreachable upstream.
    pub fn select_remote(&mut self, registry: &RemoteRegistry, name: &str) -> &mut Self {
        name.clone_into(&mut self.name);
        match registry.select(name) {
            Some(address) => address.clone_into(&mut self.remote),
            None => {
                tracing::warn!(remote = %name, "unknown remote, request will not be routable");
            }
        }
        self
    }

    /// Join the selected remote and `path` with exactly one `/`.
    pub fn set_path(&mut self, path: &str) -> &mut Self {
        self.url = compose_url(&self.remote, path);
        self
    }

    /// Resolve the deadline from the policy, using `fallback` when no layer
    /// of the policy covers `name` and `path`.
    pub fn resolve_timeout(
        &mut self,
        policy: &TimeoutPolicy,
        name: &str,
        path: &str,
        fallback: Duration,
    ) -> &mut Self {
        self.timeout = policy.lookup(name, path).unwrap_or(fallback);
        self
    }

    pub fn set_headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.headers = headers;
        self
    }

    pub fn set_query(&mut self, query: Vec<(String, String)>) -> &mut Self {
        self.query = query;
        self
    }

    pub fn set_insecure_skip_verify(&mut self, skip: bool) -> &mut Self {
        self.insecure_skip_verify = skip;
        self
    }

    /// The logical remote name the call was made with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The absolute URL to dial. Remotes given as bare `host:port` get
    /// `http://`; an empty remote yields the bare path, which never parses.
    fn target(&self) -> String {
        if self.remote.is_empty() || self.remote.contains("://") {
            self.url.clone()
        } else {
            format!("http://{}", self.url)
        }
    }

    fn build(
        &self,
        verb: Verb,
        params: &Params,
        json_body: Option<String>,
    ) -> Result<hyper::Request<Full<Bytes>>, TransportError> {
        let target = self.target();
        let mut url = Url::parse(&target).map_err(|source| TransportError::InvalidUrl {
            url: target.clone(),
            source,
        })?;

        let mut query = Vec::new();
        if verb.encoding() == Encoding::Query {
            query = params.to_pairs()?;
        }
        query.extend(self.query.iter().cloned());
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let (body, content_type) = match verb.encoding() {
            Encoding::Query => (String::new(), None),
            Encoding::Form => (params.to_form()?, Some(FORM_CONTENT_TYPE)),
            Encoding::Json => (json_body.unwrap_or_default(), Some(JSON_CONTENT_TYPE)),
        };

        let mut request = hyper::Request::builder()
            .method(verb.method())
            .uri(url.as_str())
            .body(Full::new(Bytes::from(body)))?;

        let headers = request.headers_mut();
        headers.clone_from(&self.headers);
        if let Some(content_type) = content_type {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }
        if !headers.contains_key(USER_AGENT) {
            headers.insert(
                USER_AGENT,
                HeaderValue::from_static(concat!("courier/", env!("CARGO_PKG_VERSION"))),
            );
        }

        Ok(request)
    }

    /// Execute the call and normalize whatever happens into a [`Response`].
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) async fn send(self, verb: Verb, params: Params, dispatch: Dispatch<'_>) -> Response {
        let json_body = if verb.encoding() == Encoding::Json {
            match params.to_json() {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::warn!(
                        remote = %self.remote,
                        error = %e,
                        "payload could not be encoded as JSON, nothing sent"
                    );
                    if let Some(stats) = dispatch.stats {
                        stats.record_rejection();
                    }
                    return Response::with_body(FAILURE_BODY, Some(StatusCode::NOT_ACCEPTABLE.as_u16()));
                }
            }
        } else {
            None
        };

        let start = Instant::now();
        let outcome = match self.build(verb, &params, json_body) {
            Ok(request) => {
                if dispatch.debug {
                    tracing::info!(
                        method = %request.method(),
                        uri = %request.uri(),
                        headers = ?request.headers(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "outbound request"
                    );
                }
                let client = dispatch.transport.client(self.insecure_skip_verify).clone();
                let exchange = async move {
                    let response = client.request(request).await?;
                    let status = response.status();
                    let body = response.into_body().collect().await?.to_bytes();
                    Ok::<_, TransportError>((status, body))
                };
                with_deadline(exchange, self.timeout, dispatch.cancel).await
            }
            Err(e) => Err(e),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok((status, body)) => {
                // Invalid UTF-8 becomes U+FFFD; see the `response` module docs.
                let body = String::from_utf8_lossy(&body).into_owned();
                if dispatch.debug {
                    tracing::info!(
                        status = status.as_u16(),
                        latency_ms,
                        body = %body,
                        "inbound response"
                    );
                } else {
                    tracing::debug!(status = status.as_u16(), latency_ms, "remote responded");
                }
                if let Some(stats) = dispatch.stats {
                    stats.record_success();
                }
                Response::with_body(body, Some(status.as_u16()))
            }
            Err(e) => {
                tracing::error!(
                    verb = %verb,
                    remote_name = %self.name,
                    remote = %self.remote,
                    url = %self.url,
                    param = %params,
                    error = %e,
                    latency_ms,
                    "remote call failed"
                );
                if let Some(stats) = dispatch.stats {
                    stats.record_failure();
                }
                Response::with_body(FAILURE_BODY, None)
            }
        }
    }
}

/// Trim `/` from both sides of `remote` and `path`, join them with one `/`,
/// and trim the result again.
#[must_use]
pub fn compose_url(remote: &str, path: &str) -> String {
    format!("{}/{}", remote.trim_matches('/'), path.trim_matches('/'))
        .trim_matches('/')
        .to_string()
}

async fn with_deadline<F, T>(
    exchange: F,
    timeout: Duration,
    cancel: Option<watch::Receiver<bool>>,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    let bounded = async {
        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| TransportError::TimedOut(timeout))?
    };

    match cancel {
        Some(mut cancel) => {
            tokio::select! {
                result = bounded => result,
                () = cancelled(&mut cancel) => Err(TransportError::Cancelled),
            }
        }
        None => bounded.await,
    }
}

/// Resolves once the flag is raised; never resolves if the sender is dropped
/// without raising it.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let sender_dropped = cancel.wait_for(|raised| *raised).await.is_err();
    if sender_dropped {
        std::future::pending::<()>().await;
    }
}
