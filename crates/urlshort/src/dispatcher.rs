//! Redirect dispatch: mapped paths get a redirect, everything else goes to
//! the fallback service untouched.
//!
//! Every redirect uses `307 Temporary Redirect`, which keeps the client's
//! method and body on the follow-up request. The dispatcher never produces
//! any other status itself.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::{Service, ServiceExt};
use tracing::Instrument;

use crate::resolver::MapResolver;

/// Status sent with every redirect.
pub const REDIRECT_STATUS: StatusCode = StatusCode::TEMPORARY_REDIRECT;

/// Wraps a [`MapResolver`] and a fallback service.
///
/// The fallback is any `tower::Service` that cannot fail, an axum
/// [`Router`](axum::Router) being the usual choice. Cloning is cheap when the
/// fallback is: the mapping itself is shared.
#[derive(Debug, Clone)]
pub struct RedirectDispatcher<S> {
    resolver: MapResolver,
    fallback: S,
}

impl<S> RedirectDispatcher<S> {
    pub fn new(resolver: MapResolver, fallback: S) -> Self {
        Self { resolver, fallback }
    }

    pub fn resolver(&self) -> &MapResolver {
        &self.resolver
    }

    /// The `Location` value for `path`, if it should be redirected.
    ///
    /// Missing and empty destinations both mean "not redirected". So does a
    /// destination that cannot be carried in a header (control characters).
    fn location_for(&self, path: &str) -> Option<HeaderValue> {
        let destination = self.resolver.resolve(path)?;
        if destination.is_empty() {
            return None;
        }
        match HeaderValue::from_bytes(destination.as_bytes()) {
            Ok(location) => Some(location),
            Err(_) => {
                tracing::warn!(
                    path = %path,
                    destination = ?destination,
                    "Destination is not a valid Location header, delegating to fallback"
                );
                None
            }
        }
    }
}

impl<S> RedirectDispatcher<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone,
{
    /// Answer one request.
    ///
    /// 1. Look up the request path exactly as received (no query string).
    /// 2. Non-empty destination: `307` with `Location` set to it.
    /// 3. Otherwise: hand the request, unmodified, to the fallback.
    pub async fn handle(&self, request: Request) -> Response {
        let span = urlshort_tracing::redirect_request_span!(request.uri().path());

        let location = self.location_for(request.uri().path());

        async {
            match location {
                Some(location) => {
                    let span = tracing::Span::current();
                    span.record("outcome", "redirect");
                    if let Ok(destination) = location.to_str() {
                        span.record("destination", destination);
                    }
                    tracing::debug!(status = REDIRECT_STATUS.as_u16(), "Redirecting");
                    redirect_response(location)
                }
                None => {
                    tracing::Span::current().record("outcome", "fallback");
                    tracing::debug!("No redirect, delegating to fallback");
                    match self.fallback.clone().oneshot(request).await {
                        Ok(response) => response,
                        Err(never) => match never {},
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn redirect_response(location: HeaderValue) -> Response {
    (REDIRECT_STATUS, [(header::LOCATION, location)]).into_response()
}

impl<S> Service<Request> for RedirectDispatcher<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The fallback is cloned and driven to readiness per call.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.handle(request).await) })
    }
}
