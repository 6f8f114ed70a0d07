// Error types returned by the oshi client.
//
// Callers usually care about one question: did the service reject the
// request (`Service`), did it answer with something we could not read
// (`MalformedResponse`), or did the request never complete (`Transport`,
// `InvalidUrl`)?

use crate::transport::TransportError;

/// A non-200 answer from the service. The body is kept verbatim because
/// oshi explains rejections in plain text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status {status}: {}", .body.trim())]
pub struct ServiceError {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The endpoint or admin URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be sent or the response body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// A 200 response whose body does not look like what the service promises.
    #[error("wrong response: {body}")]
    MalformedResponse { body: String },
}

impl Error {
    /// HTTP status of a service error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service(e) => Some(e.status),
            _ => None,
        }
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Error::Service(_))
    }

    /// True when the request never produced a usable response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::InvalidUrl(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
