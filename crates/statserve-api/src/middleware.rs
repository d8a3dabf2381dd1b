use std::path::PathBuf;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::error::ApiError;
use crate::stat::{self, EntryStat};

/// Routing configuration, built once and shared read-only by every request.
#[derive(Debug)]
struct ApiConfig {
    base: String,
    base_with_slash: String,
    root: PathBuf,
}

#[derive(Debug, PartialEq)]
enum RouteMatch {
    /// Exact hit on the mount point; canonicalize with a trailing slash.
    Redirect,
    /// `<base>/stats/<path>`; carries the decoded target anchored under
    /// the root.
    Stats(PathBuf),
    /// `<base>/stats/<path>` whose percent-encoding does not decode to
    /// valid UTF-8; carries the raw remainder.
    UndecodableTarget(String),
    /// Under the base path but no such sub-endpoint.
    UnknownEndpoint,
    /// Outside the base path entirely.
    PassThrough,
}

impl ApiConfig {
    fn new(base_path: &str, root: impl Into<PathBuf>) -> Self {
        let base = base_path.trim_end_matches('/').to_string();
        let base_with_slash = format!("{base}/");
        Self {
            base,
            base_with_slash,
            root: root.into(),
        }
    }

    fn route(&self, path: &str) -> RouteMatch {
        if path == self.base {
            return RouteMatch::Redirect;
        }
        if let Some(rest) = path.strip_prefix(&self.base_with_slash) {
            let rest = rest.trim_end_matches('/');
            if let Some(target) = rest.strip_prefix("stats/") {
                // Request paths arrive percent-encoded; the filesystem
                // wants the literal name.
                return match urlencoding::decode(target) {
                    Ok(decoded) => RouteMatch::Stats(self.root.join(decoded.as_ref())),
                    Err(_) => RouteMatch::UndecodableTarget(target.to_string()),
                };
            }
            return RouteMatch::UnknownEndpoint;
        }
        RouteMatch::PassThrough
    }
}

/// Mounts the stats API in front of an inner HTTP service.
///
/// `base_path` is normalized without a trailing slash. `root` anchors every
/// stats target path; it is also the reserved mount point for serving file
/// contents later, which the current logic does not do.
#[derive(Clone)]
pub struct StatsApiLayer {
    config: Arc<ApiConfig>,
}

impl StatsApiLayer {
    pub fn new(base_path: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(ApiConfig::new(base_path, root)),
        }
    }
}

impl<S> Layer<S> for StatsApiLayer {
    type Service = StatsApi<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StatsApi {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Answers requests under the base path with filesystem metadata and lets
/// everything else reach the inner service untouched.
#[derive(Clone)]
pub struct StatsApi<S> {
    inner: S,
    config: Arc<ApiConfig>,
}

impl<S> Service<Request<Body>> for StatsApi<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        match self.config.route(req.uri().path()) {
            RouteMatch::Redirect => {
                let location = self.config.base_with_slash.clone();
                Box::pin(async move { Ok(redirect(&location)) })
            }
            RouteMatch::Stats(target) => Box::pin(async move {
                let outcome = stat::resolve(target).await;
                Ok(encode(outcome))
            }),
            RouteMatch::UndecodableTarget(raw) => Box::pin(async move {
                Ok(ApiError::BadRequest { path: raw }.into_response())
            }),
            RouteMatch::UnknownEndpoint => {
                Box::pin(async move { Ok(ApiError::RouteNotFound.into_response()) })
            }
            RouteMatch::PassThrough => {
                // Hand the request to the instance poll_ready reported on.
                let clone = self.inner.clone();
                let mut inner = std::mem::replace(&mut self.inner, clone);
                Box::pin(async move { inner.call(req).await })
            }
        }
    }
}

fn redirect(location: &str) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

fn encode(outcome: Result<EntryStat, ApiError>) -> Response {
    match outcome {
        Ok(entry) => {
            tracing::info!(entry = ?entry, "stats resolved");
            Json(entry).into_response()
        }
        Err(err) => {
            tracing::info!(status = err.status().as_u16(), error = %err, "stats failed");
            err.into_response()
        }
    }
}
