// Response side: oshi answers in plain text meant for humans, so the
// structured results are scraped out with regexes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};

/// `<url> [<label>]`, one per produced artifact, in any order.
static UPLOAD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://\S+)\s+\[([^\]]+)\]").expect("upload regex"));

/// `<hashsum> (<algorithm>)`
static HASHSUM_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9a-zA-Z]+)\s+\(([^)\s]+)\)").expect("hashsum regex"));

/// URLs handed back after an upload. Which ones are present depends on the
/// directives and on what the server felt like returning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Capability URL; `DELETE` on it removes the file.
    pub admin: Option<String>,
    pub download: Option<String>,
    pub tor_download: Option<String>,
}

impl UploadResult {
    /// First path segment of the download URL, the id `hashsum` expects.
    pub fn file_id(&self) -> Option<&str> {
        let download = self.download.as_deref()?;
        let (_, rest) = download.split_once("://")?;
        rest.split('/').nth(1).filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.admin.is_none() && self.download.is_none() && self.tor_download.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashsumResult {
    pub algorithm: String,
    pub hashsum: String,
}

/// Never fails. Unknown labels are skipped and missing lines simply leave
/// their field empty; a body with no recognizable line at all yields an
/// empty result.
pub fn parse_upload(body: &str) -> UploadResult {
    let mut result = UploadResult::default();

    for caps in UPLOAD_LINE.captures_iter(body) {
        let url = caps[1].to_string();
        let label = caps[2].to_lowercase();

        match label.as_str() {
            "admin" => result.admin = Some(url),
            "download" => result.download = Some(url),
            "tor download" => result.tor_download = Some(url),
            _ => trace!(%label, "ignoring unknown upload label"),
        }
    }

    result
}

pub fn parse_hashsum(body: &str) -> Result<HashsumResult> {
    let caps = HASHSUM_LINE
        .captures(body)
        .ok_or_else(|| Error::MalformedResponse {
            body: body.to_string(),
        })?;

    Ok(HashsumResult {
        hashsum: caps[1].to_string(),
        algorithm: caps[2].to_string(),
    })
}
