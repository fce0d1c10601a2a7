//! Unified error type.

use std::net::AddrParseError;

use thiserror::Error;

/// A boxed application error, as produced by responders and middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by switchyard's fallible operations.
///
/// Lookup misses (404, 405) are not errors; the route table answers them
/// with a [`Response`](crate::Response). This type covers infrastructure
/// failures and failures raised by responders or middleware, which travel
/// up the chain unchanged until the server turns them into a 500.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address: {0}")]
    Addr(#[from] AddrParseError),

    /// The route table rejected a path (malformed or conflicting pattern).
    #[error("invalid route `{path}`: {source}")]
    Route {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    /// A failure raised by a responder or middleware.
    #[error(transparent)]
    Handler(BoxError),
}

impl Error {
    /// Wraps any application failure so it can be returned from a responder.
    ///
    /// ```rust
    /// use switchyard::Error;
    ///
    /// let err = Error::handler("database unavailable");
    /// assert_eq!(err.to_string(), "database unavailable");
    /// ```
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }
}
