//! Service errors

use datamerge_ir::IrError;
use thiserror::Error;

/// Why a spreadsheet link was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SheetUrlError {
    #[error("Invalid URL")]
    Invalid,

    #[error("Invalid URL: Not a Google Sheet")]
    NotASheet,

    #[error("Invalid URL: Missing sheet ID")]
    MissingId,
}

/// Errors raised by services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    SheetUrl(#[from] SheetUrlError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Too many redirects fetching {0}")]
    TooManyRedirects(String),

    #[error("Response from {url} is larger than {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },

    #[error("Not a supported image: {0}")]
    InvalidImage(String),

    #[error("{0}")]
    Sheet(String),

    #[error("CSV parse error: {0}")]
    Csv(String),

    #[error("Font not available: {0}")]
    FontUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Records(#[from] IrError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
