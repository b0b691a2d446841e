//! Typed property edits
//!
//! A cell value is first decoded into an [`Edit`] for its property. A value
//! of the wrong shape decodes to nothing and the property is skipped. Edits
//! that only touch the node itself are applied here; edits that need the
//! network, fonts or other nodes are finished by the registry.

use datamerge_ir::validation::{as_bool, as_hex_color, as_number, as_web_url};
use datamerge_ir::{Property, Value};
use datamerge_scene::{recolor_first_solid, Capabilities, ImageHash, ImagePaint, Node, Paint, Rgb};
use url::Url;

/// Weight given to a stroke created by a color edit
pub const DEFAULT_STROKE_WEIGHT: f64 = 1.0;

/// Color of a stroke created by a weight edit
pub const DEFAULT_STROKE_COLOR: Rgb = Rgb::BLACK;

/// A validated edit for one property
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    X(f64),
    Y(f64),
    Width(f64),
    Height(f64),
    /// Absolute rotation in degrees
    Rotation(f64),
    Text(String),
    FillColor(Rgb),
    FillImage(Url),
    StrokeColor(Rgb),
    StrokeWeight(f64),
    /// Name of the component to swap in
    Instance(String),
    Visible(bool),
}

impl Edit {
    /// Check `value` against the shape `property` expects
    pub fn decode(property: Property, value: &Value) -> Option<Self> {
        let hex = |v: &Value| as_hex_color(v).and_then(Rgb::from_hex);

        match property {
            Property::X => as_number(value).map(Edit::X),
            Property::Y => as_number(value).map(Edit::Y),
            Property::Width => as_number(value).filter(|w| *w > 0.0).map(Edit::Width),
            Property::Height => as_number(value).filter(|h| *h > 0.0).map(Edit::Height),
            Property::Rotation => as_number(value).map(Edit::Rotation),
            Property::Text => (!value.is_null()).then(|| Edit::Text(value.to_text())),
            Property::Fill => match as_web_url(value) {
                Some(url) => Some(Edit::FillImage(url)),
                None => hex(value).map(Edit::FillColor),
            },
            Property::StrokeColor => hex(value).map(Edit::StrokeColor),
            Property::StrokeWeight => as_number(value).filter(|w| *w >= 0.0).map(Edit::StrokeWeight),
            Property::Instance => value
                .as_str()
                .filter(|name| !name.is_empty())
                .map(|name| Edit::Instance(name.to_string())),
            Property::Hidden => as_bool(value).map(|hidden| Edit::Visible(!hidden)),
            Property::Visible => as_bool(value).map(Edit::Visible),
        }
    }

    /// Whether a node with `caps` accepts this edit
    pub fn is_supported_by(&self, caps: &Capabilities) -> bool {
        match self {
            Edit::X(_) | Edit::Y(_) => caps.position,
            Edit::Width(_) | Edit::Height(_) => caps.resize,
            Edit::Rotation(_) => caps.rotate,
            Edit::Text(_) => caps.text,
            Edit::FillColor(_) | Edit::FillImage(_) => caps.fills,
            Edit::StrokeColor(_) | Edit::StrokeWeight(_) => caps.strokes,
            Edit::Instance(_) => caps.instance,
            Edit::Visible(_) => caps.visibility,
        }
    }
}

/// Set the x position
pub fn set_x(node: &mut Node, x: f64) {
    node.set_x(x);
}

/// Set the y position
pub fn set_y(node: &mut Node, y: f64) {
    node.set_y(y);
}

/// Resize horizontally, then move back along the node's own x axis so the
/// edge (or middle) it is constrained to stays put
pub fn set_width(node: &mut Node, width: f64) {
    let delta = width - node.width;
    node.resize(width, node.height);
    if node.capabilities().constraints {
        let shift = delta * node.constraints.horizontal.resize_shift();
        node.transform.translate_local(-shift, 0.0);
    }
}

/// Vertical counterpart of [`set_width`]
pub fn set_height(node: &mut Node, height: f64) {
    let delta = height - node.height;
    node.resize(node.width, height);
    if node.capabilities().constraints {
        let shift = delta * node.constraints.vertical.resize_shift();
        node.transform.translate_local(0.0, -shift);
    }
}

/// Rotate to an absolute angle around the constraint-derived pivot
pub fn set_rotation(node: &mut Node, degrees: f64) {
    let pivot = node.rotation_pivot();
    node.transform = node.transform.rotated_about(pivot, degrees);
}

/// Replace the characters of a text node
pub fn set_text(node: &mut Node, characters: String) {
    if let Some(text) = node.text.as_mut() {
        text.characters = characters;
    } else {
        node.text = Some(datamerge_scene::TextContent {
            characters,
            ..Default::default()
        });
    }
}

/// Recolor the first solid fill, or add one
pub fn set_fill_color(node: &mut Node, color: Rgb) {
    recolor_first_solid(&mut node.fills, color);
}

/// Replace all fills with one image fill
pub fn set_fill_image(node: &mut Node, image: ImageHash) {
    node.fills = vec![Paint::Image(ImagePaint::fill(image))];
}

/// Recolor the first solid stroke, or add one with the default weight
pub fn set_stroke_color(node: &mut Node, color: Rgb) {
    let had_strokes = !node.strokes.is_empty();
    recolor_first_solid(&mut node.strokes, color);
    if !had_strokes {
        node.stroke_weight = DEFAULT_STROKE_WEIGHT;
    }
}

/// Set the stroke weight, adding a default stroke if there is none
pub fn set_stroke_weight(node: &mut Node, weight: f64) {
    if node.strokes.is_empty() {
        node.strokes.push(Paint::solid(DEFAULT_STROKE_COLOR));
    }
    node.stroke_weight = weight;
}

pub fn set_visible(node: &mut Node, visible: bool) {
    node.visible = visible;
}

/// Apply an edit that needs nothing beyond the node
///
/// Returns the edit back when it has to be finished elsewhere.
pub fn apply_local(node: &mut Node, edit: Edit) -> Option<Edit> {
    match edit {
        Edit::X(x) => set_x(node, x),
        Edit::Y(y) => set_y(node, y),
        Edit::Width(w) => set_width(node, w),
        Edit::Height(h) => set_height(node, h),
        Edit::Rotation(deg) => set_rotation(node, deg),
        Edit::FillColor(color) => set_fill_color(node, color),
        Edit::StrokeColor(color) => set_stroke_color(node, color),
        Edit::StrokeWeight(weight) => set_stroke_weight(node, weight),
        Edit::Visible(visible) => set_visible(node, visible),
        deferred @ (Edit::Text(_) | Edit::FillImage(_) | Edit::Instance(_)) => return Some(deferred),
    }
    None
}
