//! # DataMerge Scene - Document Tree Model
//!
//! The element tree that merges edit, and the interface the merge engine
//! uses to reach it.
//!
//! ## Key Concepts
//!
//! - **Node**: an element with a name, a kind, a transform, paints and children
//! - **Capabilities**: the fixed set of edits each node kind accepts
//! - **SceneHost**: the tree provider trait (lookup, clone, append, search)
//! - **Document**: an in-memory `SceneHost` that loads and saves JSON
//!
//! ```ignore
//! let mut doc = Document::new();
//! let card = doc.insert(doc.root(), Node::new(NodeKind::Frame, "Card"))?;
//! let copy = doc.clone_node(card)?;
//! doc.append_child(doc.root(), copy)?;
//! ```

pub mod document;
pub mod error;
pub mod host;
pub mod id;
pub mod node;
pub mod paint;
pub mod transform;

pub use document::Document;
pub use error::{SceneError, SceneResult};
pub use host::SceneHost;
pub use id::{IdGenerator, ImageHash, NodeId};
pub use node::{
    Capabilities, ConstraintType, Constraints, FontName, LayoutMode, Node, NodeKind, TextContent,
};
pub use paint::{recolor_first_solid, BlendMode, ImagePaint, Paint, Rgb, ScaleMode, SolidPaint};
pub use transform::Transform2D;
