//! # DataMerge Services
//!
//! The collaborators a merge talks to outside the document:
//! - Record sources (local files, Google Sheets tabs)
//! - Image fetching for image fills
//! - Font loading for text edits
//! - Persisted state (the last spreadsheet link)
//!
//! Network access goes through one shared `reqwest` client. Services that
//! suspend are `async-trait` traits so the merge engine can hold them as
//! `Arc<dyn ...>`.

pub mod csv;
pub mod error;
pub mod font;
pub mod http;
pub mod images;
pub mod sheet;
pub mod source;
pub mod store;

pub use error::{ServiceError, ServiceResult, SheetUrlError};
pub use font::{FontLoader, StaticFontLoader};
pub use http::HttpClient;
pub use images::{validate_image, HttpImageSource, ImageSource, MemoryImageSource, PIXEL_PNG};
pub use sheet::SheetUrl;
pub use source::{FileRecordSource, RecordFormat, RecordSource, SheetRecordSource};
pub use store::{FileStore, KeyValueStore, MemoryStore, SHEET_URL_KEY};
