// Library root
// -----------
// Client for the oshi.at anonymous file host. The binary (`main.rs`) is a
// thin interactive front-end over the same modules.
//
// Module responsibilities:
// - `api`: the `Client` façade (upload, hashsum, delete, onion endpoint)
//   and its configuration.
// - `request`: the `Image` upload payload and URL builders.
// - `response`: result types and the plain-text response parsers.
// - `transport`: the HTTP seam, with a blocking reqwest implementation.
// - `error`: error types shared by all of the above.
// - `history`: uploads remembered by the CLI between runs.
// - `ui`: terminal menus used by the binary.
pub mod api;
pub mod error;
pub mod history;
pub mod request;
pub mod response;
pub mod transport;
pub mod ui;

pub use api::{CallContext, Client, ClientConfig, DEFAULT_ENDPOINT};
pub use error::{Error, Result, ServiceError};
pub use request::Image;
pub use response::{HashsumResult, UploadResult};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
