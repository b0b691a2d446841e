//! # DataMerge IR - Records and Edits
//!
//! The data that flows through a merge:
//!
//! ```text
//! RawRecord ──► normalize ──► NormalizedRecord ──► PropertyUpdate ──► UpdateResult ──► MergeOutcome
//! ```
//!
//! ## Key Concepts
//!
//! - **Value**: an untyped cell value
//! - **NormalizedRecord**: element name to property name to value
//! - **Property**: the closed set of property names with an updater
//! - **MergeOutcome**: produced copies plus per-edit failures

pub mod error;
pub mod outcome;
pub mod property;
pub mod record;
pub mod update;
pub mod validation;
pub mod value;

pub use error::{IrError, IrResult};
pub use outcome::{FailureReason, MergeOutcome, UpdateFailure, UpdateResult};
pub use property::{Property, PropertyKey};
pub use record::{flatten, normalize, records_from_json, split_key, NormalizedRecord, PropertyMap, RawRecord};
pub use update::PropertyUpdate;
pub use value::Value;
