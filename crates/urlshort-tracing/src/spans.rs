//! Span builder helpers for redirect instrumentation.

/// Create the span wrapping one dispatched request.
///
/// Usage: `let span = redirect_request_span!(path);`
///
/// Fields recorded once the path is resolved:
/// - `outcome`: `redirect` or `fallback`
/// - `destination`: the `Location` sent to the client, redirects only
#[macro_export]
macro_rules! redirect_request_span {
    ($path:expr) => {
        tracing::info_span!(
            "redirect_request",
            path = %$path,
            outcome = tracing::field::Empty,
            destination = tracing::field::Empty,
        )
    };
}

/// Create the span covering mapping construction at startup.
#[macro_export]
macro_rules! mapping_load_span {
    ($source:expr) => {
        tracing::info_span!(
            "mapping_load",
            source = %$source,
            paths = tracing::field::Empty,
        )
    };
}
