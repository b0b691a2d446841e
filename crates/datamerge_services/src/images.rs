//! Image sources for image fills

use crate::error::{ServiceError, ServiceResult};
use crate::http::HttpClient;
use async_trait::async_trait;
use ::image::ImageFormat;
use parking_lot::RwLock;
use std::collections::HashMap;
use url::Url;

/// Fetches image bytes for a URL
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Get the raw bytes behind `url`
    async fn fetch(&self, url: &Url) -> ServiceResult<Vec<u8>>;
}

/// Check that bytes are an image format we can register
pub fn validate_image(bytes: &[u8]) -> ServiceResult<ImageFormat> {
    if bytes.is_empty() {
        return Err(ServiceError::InvalidImage("empty body".to_string()));
    }
    ::image::guess_format(bytes).map_err(|e| ServiceError::InvalidImage(e.to_string()))
}

/// Fetches images over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: HttpClient,
    /// Prefix put in front of every URL, e.g. `http://localhost:8080/?url=`
    proxy: Option<String>,
}

impl HttpImageSource {
    pub fn new(client: HttpClient) -> Self {
        Self { client, proxy: None }
    }

    /// Route requests through a prefixing proxy
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &Url) -> ServiceResult<Vec<u8>> {
        let target = match &self.proxy {
            Some(proxy) => format!("{}{}", proxy, url),
            None => url.to_string(),
        };
        log::debug!("Fetching image {}", target);
        self.client.fetch_bytes(&target).await
    }
}

/// Serves images from memory, keyed by URL
#[derive(Debug, Default)]
pub struct MemoryImageSource {
    images: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`
    pub fn with_image(self, url: &str, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }

    pub fn insert(&self, url: &str, bytes: Vec<u8>) {
        self.images.write().insert(url.to_string(), bytes);
    }
}

#[async_trait]
impl ImageSource for MemoryImageSource {
    async fn fetch(&self, url: &Url) -> ServiceResult<Vec<u8>> {
        self.images
            .read()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(url.to_string()))
    }
}

/// Smallest valid PNG: a 1x1 transparent pixel
pub const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];
