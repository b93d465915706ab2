use std::io::Read;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{
    CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};

use crate::error::MirrorError;

/// Streaming body of a file request together with the headers the mirror checks.
pub struct FileResponse {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: Box<dyn Read + Send>,
}

pub trait IsoClient {
    /// Raw bytes of a directory listing page.
    fn fetch_page(&self, url: &str) -> Result<Vec<u8>, MirrorError>;
    /// Opens a file for streaming. Status is checked; headers are left to the caller.
    fn open_file(&self, url: &str) -> Result<FileResponse, MirrorError>;
}

impl<T: IsoClient + ?Sized> IsoClient for &T {
    fn fetch_page(&self, url: &str) -> Result<Vec<u8>, MirrorError> {
        (**self).fetch_page(url)
    }

    fn open_file(&self, url: &str) -> Result<FileResponse, MirrorError> {
        (**self).open_file(url)
    }
}

/// One session for the whole run so cookies and connections are reused.
#[derive(Clone)]
pub struct IsoHttpClient {
    client: Client,
}

impl IsoHttpClient {
    pub fn new() -> Result<Self, MirrorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!(
                "iso-standards-downloader/{}",
                env!("CARGO_PKG_VERSION")
            ))
            .map_err(|err| MirrorError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(30))
            .timeout(None)
            .build()
            .map_err(|err| MirrorError::Http(err.to_string()))?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<Response, MirrorError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| MirrorError::Http(err.to_string()))?;
        Self::handle_status(response)
    }

    fn handle_status(response: Response) -> Result<Response, MirrorError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .status()
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
        Err(MirrorError::Status { status, message })
    }
}

impl IsoClient for IsoHttpClient {
    fn fetch_page(&self, url: &str) -> Result<Vec<u8>, MirrorError> {
        let response = self.get(url)?;
        if response.headers().get(CONTENT_TYPE).is_none() {
            return Err(MirrorError::MissingHeader("Content-Type"));
        }
        let bytes = response
            .bytes()
            .map_err(|err| MirrorError::Http(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn open_file(&self, url: &str) -> Result<FileResponse, MirrorError> {
        let response = self.get(url)?;
        let content_type = content_type(response.headers());
        let content_length = content_length(response.headers());
        Ok(FileResponse {
            content_type,
            content_length,
            body: Box::new(response),
        })
    }
}

/// Lower-cased `Content-Type`; `None` when absent or not visible ASCII.
pub fn content_type(headers: &HeaderMap) -> Option<String> {
    header_str(headers, CONTENT_TYPE).map(|value| value.to_lowercase())
}

/// `Content-Length` as a byte count; `None` when absent or unparsable.
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, CONTENT_LENGTH).and_then(|value| value.trim().parse().ok())
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
