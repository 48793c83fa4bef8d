/* src/middleware.rs */

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    response::Response,
};
use futures_util::future::BoxFuture;
use std::{
    convert::Infallible,
    net::IpAddr,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::debug;

use crate::resolver::IpResolver;

/// Extension that holds the resolved client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    /// The address as it appeared in the request.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address parsed, if it is a valid IP address.
    pub fn ip(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }
}

/// Which resolution a [`ClientIpLayer`] performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    /// [`IpResolver::client_ip`]: left-most forwarded entry, any address.
    #[default]
    Client,
    /// [`IpResolver::client_public_ip`]: public addresses only.
    Public,
}

/// Layer that resolves the client address of each request and stores it as a
/// [`ClientIp`] request extension.
///
/// Nothing is stored when resolution yields an empty address.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use clientip::{ClientIp, ClientIpLayer};
///
/// async fn handler(ip: ClientIp) -> String {
///     ip.0
/// }
///
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(ClientIpLayer::public());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientIpLayer {
    resolver: IpResolver,
    resolution: Resolution,
}

impl ClientIpLayer {
    /// Layer storing [`IpResolver::client_ip`] with the default headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer storing [`IpResolver::client_public_ip`] with the default headers.
    pub fn public() -> Self {
        Self {
            resolver: IpResolver::default(),
            resolution: Resolution::Public,
        }
    }

    /// Use a custom resolver configuration.
    pub fn with_resolver(mut self, resolver: IpResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }
}

impl<S> Layer<S> for ClientIpLayer {
    type Service = ClientIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientIpService {
            inner,
            resolver: self.resolver.clone(),
            resolution: self.resolution,
        }
    }
}

/// Service that resolves client addresses.
#[derive(Debug, Clone)]
pub struct ClientIpService<S> {
    inner: S,
    resolver: IpResolver,
    resolution: Resolution,
}

impl<S> Service<Request> for ClientIpService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let ip = match self.resolution {
            Resolution::Client => self.resolver.client_ip(&req),
            Resolution::Public => self.resolver.client_public_ip(&req),
        };

        if ip.is_empty() {
            debug!(resolution = ?self.resolution, "no client ip resolved");
        } else {
            debug!(%ip, resolution = ?self.resolution, "resolved client ip");
            req.extensions_mut().insert(ClientIp(ip));
        }

        let future = self.inner.call(req);
        Box::pin(future)
    }
}

/// Axum extractor for the client address.
///
/// Uses the address stored by [`ClientIpLayer`] when present; otherwise
/// resolves [`IpResolver::client_ip`] from the request parts, which may give
/// an empty address.
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ip) = parts.extensions.get::<ClientIp>() {
            return Ok(ip.clone());
        }
        Ok(ClientIp(IpResolver::default().client_ip(&*parts)))
    }
}
