//! Shared HTTP client
//!
//! One `reqwest` client (rustls, bounded redirects) is built per run and
//! cloned into every service that fetches. Bodies are read chunk by chunk and
//! cut off at a size limit.

use crate::error::{ServiceError, ServiceResult};
use reqwest::redirect::Policy;

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 5;

/// Largest body read before a fetch is abandoned
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Cheap to clone; clones share one connection pool
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpClient {
    pub fn new() -> ServiceResult<Self> {
        let inner = reqwest::Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("datamerge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            inner,
            max_body_bytes: MAX_BODY_BYTES,
        })
    }

    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// GET `url` and return the body of a 2xx response
    pub async fn fetch_bytes(&self, url: &str) -> ServiceResult<Vec<u8>> {
        let mut response = self
            .inner
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| classify(url, e))?;

        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes as u64 {
                return Err(self.too_large(url));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify(url, e))? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }
        log::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// GET `url` as text, with invalid UTF-8 replaced
    pub async fn fetch_text(&self, url: &str) -> ServiceResult<String> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn too_large(&self, url: &str) -> ServiceError {
        ServiceError::BodyTooLarge {
            url: url.to_string(),
            limit: self.max_body_bytes,
        }
    }
}

fn classify(url: &str, err: reqwest::Error) -> ServiceError {
    if err.is_redirect() {
        ServiceError::TooManyRedirects(url.to_string())
    } else if let Some(status) = err.status() {
        ServiceError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        }
    } else {
        ServiceError::Http(err)
    }
}
