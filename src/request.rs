// Request side: the upload payload (`Image`) and the URL builders for
// every oshi endpoint.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use url::Url;

use crate::api::ClientConfig;
use crate::error::Result;
use crate::transport::RequestBody;

const FILENAME: &str = "filename";
const EXPIRE: &str = "expire";
const AUTODESTROY: &str = "autodestroy";
const RANDOMIZEFN: &str = "randomizefn";
const SHORTURL: &str = "shorturl";

const ONION: &str = "onion";
const HASHSUM: &str = "hashsum";

/// A file to upload together with its directives.
///
/// Every directive defaults to "let the server decide": no expiry
/// override, no auto-destroy, original filename, no short URL.
pub struct Image {
    source: Box<dyn Read + Send>,
    len: Option<u64>,
    filename: String,
    expire: u64,
    autodestroy: bool,
    randomizefn: bool,
    shorturl: bool,
}

impl Image {
    /// Wrap any reader. The reader is streamed to the server as-is and
    /// cannot be reused once the upload ran, successful or not.
    pub fn new<R>(source: R, filename: impl Into<String>) -> Self
    where
        R: Read + Send + 'static,
    {
        Image {
            source: Box::new(source),
            len: None,
            filename: filename.into(),
            expire: 0,
            autodestroy: false,
            randomizefn: false,
            shorturl: false,
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Image {
            len: Some(len),
            ..Image::new(Cursor::new(bytes), filename)
        }
    }

    /// Open a file from disk, using its file name as the upload name.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Image {
            len: Some(len),
            ..Image::new(file, filename)
        })
    }

    /// Days until the file expires. Zero keeps the server default.
    pub fn expire(mut self, days: u64) -> Self {
        self.expire = days;
        self
    }

    /// Delete the file after its first download.
    pub fn autodestroy(mut self, on: bool) -> Self {
        self.autodestroy = on;
        self
    }

    pub fn randomize_filename(mut self, on: bool) -> Self {
        self.randomizefn = on;
        self
    }

    pub fn short_url(mut self, on: bool) -> Self {
        self.shorturl = on;
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn expire_days(&self) -> u64 {
        self.expire
    }

    pub(crate) fn into_body(self) -> RequestBody {
        RequestBody {
            reader: self.source,
            len: self.len,
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("filename", &self.filename)
            .field("len", &self.len)
            .field("expire", &self.expire)
            .field("autodestroy", &self.autodestroy)
            .field("randomizefn", &self.randomizefn)
            .field("shorturl", &self.shorturl)
            .finish_non_exhaustive()
    }
}

/// Upload target: the bare endpoint plus only the directives that differ
/// from their defaults. The server reads a missing parameter as "default",
/// so `false`/`0` are never sent.
pub fn upload_url(config: &ClientConfig, image: &Image) -> Result<Url> {
    let mut url = Url::parse(&config.endpoint)?;

    let mut pairs: Vec<(&str, String)> = Vec::new();
    if image.filename != FILENAME {
        pairs.push((FILENAME, image.filename.clone()));
    }
    if image.expire > 0 {
        pairs.push((EXPIRE, image.expire.to_string()));
    }
    if image.autodestroy {
        pairs.push((AUTODESTROY, "1".into()));
    }
    if image.randomizefn {
        pairs.push((RANDOMIZEFN, "1".into()));
    }
    if image.shorturl {
        pairs.push((SHORTURL, "1".into()));
    }

    // query_pairs_mut leaves a dangling '?' behind, so only touch the
    // query when there is something to add
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url)
}

pub fn hashsum_url(config: &ClientConfig, file_id: &str) -> Result<Url> {
    join_path(&config.endpoint, &[HASHSUM, file_id])
}

pub fn onion_url(config: &ClientConfig) -> Result<Url> {
    join_path(&config.endpoint, &[ONION])
}

pub fn delete_url(admin_url: &str) -> Result<Url> {
    Ok(Url::parse(admin_url)?)
}

fn join_path(endpoint: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
