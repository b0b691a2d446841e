//! Elements of the document tree
//!
//! Every [`Node`] has a [`NodeKind`], and the kind fixes which edits the node
//! accepts through its [`Capabilities`]. Edits check the capability set up
//! front instead of probing for fields.

use crate::id::NodeId;
use crate::paint::Paint;
use crate::transform::Transform2D;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Closed set of element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Page,
    Frame,
    Group,
    Component,
    Instance,
    Rectangle,
    Ellipse,
    Polygon,
    Vector,
    Line,
    Text,
}

impl NodeKind {
    /// Edits this kind of node supports
    pub fn capabilities(self) -> Capabilities {
        let shape = Capabilities {
            position: true,
            visibility: true,
            resize: true,
            rotate: true,
            fills: true,
            strokes: true,
            constraints: true,
            ..Capabilities::none()
        };

        match self {
            NodeKind::Page => Capabilities {
                children: true,
                ..Capabilities::none()
            },
            NodeKind::Frame | NodeKind::Component => Capabilities {
                children: true,
                ..shape
            },
            NodeKind::Instance => Capabilities {
                children: true,
                instance: true,
                ..shape
            },
            NodeKind::Group => Capabilities {
                position: true,
                visibility: true,
                resize: true,
                rotate: true,
                children: true,
                ..Capabilities::none()
            },
            NodeKind::Rectangle | NodeKind::Ellipse | NodeKind::Polygon | NodeKind::Vector => shape,
            NodeKind::Line => Capabilities {
                fills: false,
                ..shape
            },
            NodeKind::Text => Capabilities { text: true, ..shape },
        }
    }
}

/// What a node kind exposes to editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Position can be set
    pub position: bool,
    /// Can be shown and hidden
    pub visibility: bool,
    /// Width and height can be set
    pub resize: bool,
    /// Rotation can be set
    pub rotate: bool,
    /// Has a fill paint list
    pub fills: bool,
    /// Has a stroke paint list and stroke weight
    pub strokes: bool,
    /// Has editable text content
    pub text: bool,
    /// Can contain child nodes (and so supports descendant search)
    pub children: bool,
    /// Carries layout constraints
    pub constraints: bool,
    /// Is backed by a swappable main component
    pub instance: bool,
}

impl Capabilities {
    /// No capabilities at all
    pub const fn none() -> Self {
        Self {
            position: false,
            visibility: false,
            resize: false,
            rotate: false,
            fills: false,
            strokes: false,
            text: false,
            children: false,
            constraints: false,
            instance: false,
        }
    }
}

/// How a node is anchored to its parent along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    #[default]
    Min,
    Center,
    Max,
    Stretch,
    Scale,
}

impl ConstraintType {
    /// Fraction of a size change the position moves back by so the anchored
    /// edge (or middle) stays put
    pub fn resize_shift(self) -> f64 {
        match self {
            ConstraintType::Min => 0.0,
            ConstraintType::Center | ConstraintType::Stretch | ConstraintType::Scale => 0.5,
            ConstraintType::Max => 1.0,
        }
    }

    /// Position of the rotation pivot as a fraction of the size on this axis
    pub fn pivot_fraction(self) -> f64 {
        match self {
            ConstraintType::Max => 1.0,
            ConstraintType::Center => 0.5,
            _ => 0.0,
        }
    }
}

/// Horizontal and vertical constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub horizontal: ConstraintType,
    #[serde(default)]
    pub vertical: ConstraintType,
}

impl Constraints {
    pub fn new(horizontal: ConstraintType, vertical: ConstraintType) -> Self {
        Self { horizontal, vertical }
    }
}

/// Auto-layout mode of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    None,
    Horizontal,
    Vertical,
}

impl LayoutMode {
    /// Whether the container positions its children itself
    pub fn arranges_children(self) -> bool {
        !matches!(self, LayoutMode::None)
    }
}

/// A font family and style pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl Default for FontName {
    fn default() -> Self {
        Self::new("Inter", "Regular")
    }
}

impl std::fmt::Display for FontName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

/// Text content of a text node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub characters: String,
    #[serde(default)]
    pub font: FontName,
}

fn default_true() -> bool {
    true
}

/// An element of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    /// Non-unique name used for matching
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub transform: Transform2D,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub layout_mode: LayoutMode,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub stroke_weight: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    /// Component backing an instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_component: Option<NodeId>,
    #[serde(default)]
    children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<NodeId>,
}

impl Node {
    /// Create a detached node; the id is assigned when it is inserted into a document
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::from_raw(0),
            name: name.into(),
            kind,
            transform: Transform2D::IDENTITY,
            width: 0.0,
            height: 0.0,
            constraints: Constraints::default(),
            layout_mode: LayoutMode::None,
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: 0.0,
            visible: true,
            text: (kind == NodeKind::Text).then(TextContent::default),
            main_component: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Set position
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.transform.set_translation(x, y);
        self
    }

    /// Set size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set constraints
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Set auto-layout mode
    pub fn with_layout_mode(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = mode;
        self
    }

    /// Set fills
    pub fn with_fills(mut self, fills: Vec<Paint>) -> Self {
        self.fills = fills;
        self
    }

    /// Set strokes and weight
    pub fn with_strokes(mut self, strokes: Vec<Paint>, weight: f64) -> Self {
        self.strokes = strokes;
        self.stroke_weight = weight;
        self
    }

    /// Set text content
    pub fn with_text(mut self, characters: impl Into<String>, font: FontName) -> Self {
        self.text = Some(TextContent {
            characters: characters.into(),
            font,
        });
        self
    }

    /// Set the backing component
    pub fn with_main_component(mut self, component: NodeId) -> Self {
        self.main_component = Some(component);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    pub fn x(&self) -> f64 {
        self.transform.translation().x
    }

    pub fn y(&self) -> f64 {
        self.transform.translation().y
    }

    pub fn set_x(&mut self, x: f64) {
        let y = self.y();
        self.transform.set_translation(x, y);
    }

    pub fn set_y(&mut self, y: f64) {
        let x = self.x();
        self.transform.set_translation(x, y);
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f64 {
        self.transform.rotation_degrees()
    }

    /// Set width and height without moving the node
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Local point the node rotates around, derived from its constraints
    ///
    /// Nodes without constraints rotate around their origin.
    pub fn rotation_pivot(&self) -> DVec2 {
        if !self.capabilities().constraints {
            return DVec2::ZERO;
        }
        DVec2::new(
            self.width * self.constraints.horizontal.pivot_fraction(),
            self.height * self.constraints.vertical.pivot_fraction(),
        )
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}
