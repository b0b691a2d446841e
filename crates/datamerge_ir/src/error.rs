//! Errors for record decoding

use thiserror::Error;

/// Errors raised while turning raw data into records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IrError {
    #[error("Record {index} is not an object (got {found})")]
    NotAnObject { index: usize, found: &'static str },

    #[error("Records must be a JSON array of objects")]
    NotAnArray,

    #[error("JSON parse error: {0}")]
    Json(String),
}

pub type IrResult<T> = Result<T, IrError>;
