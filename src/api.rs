// API client module: the public face of the crate. Each operation builds
// its request, runs it through the configured transport exactly once and
// turns the answer into a typed result.

use std::time::Duration;

use reqwest::Method;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, ServiceError};
use crate::request::{self, Image};
use crate::response::{self, HashsumResult, UploadResult};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub const DEFAULT_ENDPOINT: &str = "https://oshi.at";

/// Client configuration. Fixed once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the oshi instance.
    pub endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Per-call execution context. Carries the deadline for a single
/// operation; `CallContext::default()` means no deadline. `ReqwestTransport`
/// sets none of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallContext {
    timeout: Option<Duration>,
}

impl CallContext {
    pub fn background() -> Self {
        CallContext::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        CallContext {
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// oshi.at API client.
///
/// Holds no mutable state, so one instance can be shared between threads.
#[derive(Debug, Clone)]
pub struct Client<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Client for the public instance with the default reqwest transport.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Client { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload a file. The returned URLs depend on the image directives;
    /// callers should check for the ones they need.
    pub fn upload(&self, cx: &CallContext, image: Image) -> Result<UploadResult> {
        let url = request::upload_url(&self.config, &image)?;
        let mut req = HttpRequest::new(Method::PUT, url);
        req.body = Some(image.into_body());

        let body = self.execute(cx, req)?.text()?;
        Ok(response::parse_upload(&body))
    }

    /// Fetch the hashsum of an uploaded file. `file_id` is the first path
    /// segment of its download URL, see [`UploadResult::file_id`].
    pub fn hashsum(&self, cx: &CallContext, file_id: &str) -> Result<HashsumResult> {
        let url = request::hashsum_url(&self.config, file_id)?;
        let body = self.execute(cx, HttpRequest::new(Method::GET, url))?.text()?;

        response::parse_hashsum(&body).map_err(|e| {
            warn!(%file_id, "unexpected hashsum response");
            e
        })
    }

    /// Delete a file through the admin URL returned by its upload.
    pub fn delete(&self, cx: &CallContext, admin_url: &str) -> Result<()> {
        let url = request::delete_url(admin_url)?;
        self.execute(cx, HttpRequest::new(Method::DELETE, url))?;
        Ok(())
    }

    /// Onion hostname of the service, exactly as the server sends it.
    pub fn tor_endpoint(&self, cx: &CallContext) -> Result<String> {
        let url = request::onion_url(&self.config)?;
        Ok(self.execute(cx, HttpRequest::new(Method::GET, url))?.text()?)
    }

    /// Run one exchange and keep only 200 answers. Anything else is read
    /// in full and returned as a `ServiceError`.
    fn execute(&self, cx: &CallContext, mut req: HttpRequest) -> Result<HttpResponse> {
        req.timeout = cx.timeout();
        let method = req.method.clone();
        let url = log_target(&method, &req.url);

        debug!(%method, %url, "oshi request");
        let res = self.transport.execute(req)?;
        debug!(%method, %url, status = res.status, "oshi response");

        if res.status != 200 {
            let status = res.status;
            let body = res.text()?;
            warn!(%method, %url, status, "oshi rejected request");
            return Err(ServiceError { status, body }.into());
        }

        Ok(res)
    }
}

/// URL as it may appear in logs. An admin URL grants deletion rights, so
/// for DELETE only the origin is kept.
fn log_target(method: &Method, url: &Url) -> String {
    if *method == Method::DELETE {
        format!("{}/<admin>", url.origin().ascii_serialization())
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn admin_url_is_not_logged() {
        let admin = Url::parse("https://oshi.at/a/AbCd/secret-token").unwrap();
        let logged = log_target(&Method::DELETE, &admin);
        assert_eq!(logged, "https://oshi.at/<admin>");
        assert!(!logged.contains("secret-token"));
    }

    #[test]
    fn other_urls_are_logged_in_full() {
        let url = Url::parse("https://oshi.at/hashsum/AbCd").unwrap();
        assert_eq!(log_target(&Method::GET, &url), "https://oshi.at/hashsum/AbCd");
    }
}
