// HTTP transport seam.
//
// The client never talks to reqwest directly: it hands a fully built
// `HttpRequest` to a `Transport` and gets back a status plus a readable
// body. `ReqwestTransport` is the default; tests plug in their own.

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Body, Client};
use reqwest::Method;
use tracing::trace;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Streamed request payload. The reader is consumed once by the transport.
pub struct RequestBody {
    pub reader: Box<dyn Read + Send>,
    /// Known length, sent as Content-Length when present.
    pub len: Option<u64>,
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody").field("len", &self.len).finish()
    }
}

#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Deadline for the whole exchange, taken from the caller's `CallContext`.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        HttpRequest {
            method,
            url,
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    /// Drain the body into a string. Invalid UTF-8 is replaced rather than
    /// rejected since oshi only ever answers with plain text.
    pub fn text(mut self) -> Result<String, TransportError> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Executes one HTTP exchange. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        // reqwest's blocking client defaults to a 30s deadline; the only
        // deadline here is the one carried by each request
        let http = Client::builder()
            .user_agent(format!("oshi-client/{}", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;
        Ok(ReqwestTransport { http })
    }
}

impl From<Client> for ReqwestTransport {
    fn from(http: Client) -> Self {
        ReqwestTransport { http }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!(method = %request.method, host = ?request.url.host_str(), timeout = ?request.timeout, "reqwest send");

        let mut builder = self.http.request(request.method, request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = match body.len {
                Some(len) => builder.body(Body::sized(body.reader, len)),
                None => builder.body(Body::new(body.reader)),
            };
        }

        let res = builder.send()?;
        Ok(HttpResponse {
            status: res.status().as_u16(),
            body: Box::new(res),
        })
    }
}
