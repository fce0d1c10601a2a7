//! Outgoing HTTP response type and the conversion traits handlers return through.
//!
//! Build a [`Response`] in your responder and return it, or return anything
//! that implements [`IntoResult`]: a `&'static str`, a `String`, a bare
//! [`StatusCode`], or a `Result` of any of those when the responder can fail.

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use http::StatusCode;
use http::header::{HeaderName, HeaderValue};
use http_body_util::Full;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::warn;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    EventStream,  // text/event-stream  (SSE)
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::EventStream => "text/event-stream",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }
}

// ── Upgrade ───────────────────────────────────────────────────────────────────

/// The duplex stream handed to an upgrade callback once the handshake is done.
pub trait Io: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Io for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

type UpgradeFn = Box<dyn FnOnce(Request, Box<dyn Io>) -> BoxFuture<'static, Result<(), Error>> + Send>;

/// A post-handshake callback attached with [`Response::on_upgrade`].
///
/// The server runs it after sending a `101 Switching Protocols` response,
/// passing the original request and the upgraded connection.
pub struct Upgrade(UpgradeFn);

impl Upgrade {
    pub async fn run(self, req: Request, io: Box<dyn Io>) -> Result<(), Error> {
        (self.0)(req, io).await
    }
}

impl fmt::Debug for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Upgrade(..)")
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use switchyard::{Response, StatusCode};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use switchyard::{ContentType, Response, StatusCode};
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
///
/// Response::builder()
///     .bytes(ContentType::Html, b"<p>ok</p>".to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Bytes,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: StatusCode,
    pub(crate) upgrade: Option<Upgrade>,
}

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self::builder().status(code).no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Appends a header, keeping any existing ones with the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Renders `"HTTP/1.1 <code> <reason>\n"`.
    pub fn status_line(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or(""),
        )
    }

    /// Drops the body, keeping status and headers (the answer to `HEAD`).
    pub fn without_body(mut self) -> Self {
        self.body = Bytes::new();
        self
    }

    /// Attaches a callback to run on the upgraded connection.
    ///
    /// Pair it with `101 Switching Protocols` and the protocol's handshake
    /// headers; the server only hands over the connection for a 101.
    ///
    /// ```rust
    /// use switchyard::{Response, StatusCode};
    /// use tokio::io::AsyncWriteExt;
    ///
    /// let res = Response::builder()
    ///     .status(StatusCode::SWITCHING_PROTOCOLS)
    ///     .header("upgrade", "echo")
    ///     .no_body()
    ///     .on_upgrade(|_req, mut io| async move {
    ///         io.write_all(b"hello").await?;
    ///         Ok::<_, switchyard::Error>(())
    ///     });
    /// assert!(res.has_upgrade());
    /// ```
    pub fn on_upgrade<F, Fut>(mut self, callback: F) -> Self
    where
        F: FnOnce(Request, Box<dyn Io>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.upgrade = Some(Upgrade(Box::new(move |req, io| Box::pin(callback(req, io)))));
        self
    }

    pub fn has_upgrade(&self) -> bool {
        self.upgrade.is_some()
    }

    /// Detaches the upgrade callback, if any.
    pub fn take_upgrade(&mut self) -> Option<Upgrade> {
        self.upgrade.take()
    }

    /// Converts into the `http` type hyper writes. Headers whose name or
    /// value is not valid on the wire are dropped with a warning.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;

        for (name, value) in &self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

/// Status line followed by one `name: value` line per header.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_line())?;
        for (name, value) in &self.headers {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(ContentType::Json, body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text, Bytes::from(body.into()))
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type, body.into())
    }

    /// Terminate with no body (e.g. `204 No Content`, `101 Switching Protocols`).
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status, upgrade: None }
    }

    fn finish(self, content_type: ContentType, body: Bytes) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.as_str().to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status, upgrade: None }
    }
}

// ── IntoResponse / IntoResult ─────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from responders.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a status directly from a responder: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

/// What a responder's future may resolve to.
///
/// Infallible values become `Ok`; a `Result` keeps its error, converted into
/// [`Error`], so failures reach the caller unchanged.
pub trait IntoResult {
    fn into_result(self) -> Result<Response, Error>;
}

macro_rules! infallible {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoResult for $ty {
                fn into_result(self) -> Result<Response, Error> {
                    Ok(self.into_response())
                }
            }
        )*
    };
}

infallible!(Response, &'static str, String, StatusCode);

impl<T, E> IntoResult for Result<T, E>
where
    T: IntoResponse,
    E: Into<Error>,
{
    fn into_result(self) -> Result<Response, Error> {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_uses_canonical_reason() {
        assert_eq!(Response::text("hi").status_line(), "HTTP/1.1 200 OK\n");
        assert_eq!(
            Response::status(StatusCode::NOT_FOUND).status_line(),
            "HTTP/1.1 404 Not Found\n",
        );
    }

    #[test]
    fn display_renders_status_line_then_headers() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/users/42")
            .json(Bytes::from_static(b"{}"));

        assert_eq!(
            res.to_string(),
            "HTTP/1.1 201 Created\ncontent-type: application/json\nlocation: /users/42\n",
        );
    }

    #[test]
    fn header_lookup_ignores_case() {
        let res = Response::text("x");
        assert_eq!(res.header("Content-Type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn into_http_drops_invalid_headers() {
        let res = Response::text("body")
            .with_header("x-ok", "yes")
            .with_header("bad header", "no");
        let http = res.into_http();

        assert_eq!(http.status(), StatusCode::OK);
        assert_eq!(http.headers()["x-ok"], "yes");
        assert_eq!(http.headers().len(), 2);
    }

    #[test]
    fn results_keep_their_errors() {
        let ok: Result<&'static str, Error> = Ok("fine");
        assert_eq!(ok.into_result().unwrap().body().as_ref(), b"fine");

        let err: Result<Response, Error> = Err(Error::handler("nope"));
        assert!(matches!(err.into_result(), Err(Error::Handler(_))));
    }

    #[tokio::test]
    async fn upgrade_callback_receives_the_stream() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let mut res = Response::status(StatusCode::SWITCHING_PROTOCOLS)
            .on_upgrade(|req, mut io| async move {
                io.write_all(req.path().as_bytes()).await?;
                Ok::<_, Error>(())
            });
        let upgrade = res.take_upgrade().expect("callback attached");
        assert!(!res.has_upgrade());

        let (server, mut client) = tokio::io::duplex(64);
        upgrade.run(Request::new(http::Method::GET, "/chat"), Box::new(server)).await.unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"/chat");
    }
}
