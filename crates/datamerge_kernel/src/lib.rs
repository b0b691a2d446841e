//! # DataMerge Kernel - Merge Engine
//!
//! Turns records into edited copies of a template.
//!
//! ## Architecture
//!
//! ```text
//! records ──► normalize ──► clone root ──► find_by_name ──► UpdaterRegistry ──► MergeOutcome
//!             (per record)  (per record)   (per element)    (concurrent batch)
//! ```
//!
//! ## Key Concepts
//!
//! - **Matcher**: resolves an element name inside a copy, the copy included
//! - **Edit**: a cell value checked against the shape its property expects
//! - **UpdaterRegistry**: runs one property update, reporting only real failures
//! - **MergeEngine**: clones, places, resolves and applies, then selects the copies

pub mod edit;
pub mod error;
pub mod matcher;
pub mod merge;
pub mod registry;

pub use edit::{Edit, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WEIGHT};
pub use error::{MergeError, MergeResult};
pub use matcher::find_by_name;
pub use merge::{MergeEngine, MergeOptions, DEFAULT_GAP, DEFAULT_MAX_CONCURRENT_UPDATES};
pub use registry::UpdaterRegistry;
