//! Fill and stroke paints

use crate::id::ImageHash;
use serde::{Deserialize, Serialize};

/// RGB color with channels in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };

    /// Create a color from 0.0..=1.0 channels
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0);
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Some(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => None,
        }
    }

    /// Format as lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

/// Blend modes for paint composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Darken,
    Multiply,
    Lighten,
    Screen,
    Overlay,
}

/// How an image fills its node's bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    #[default]
    Fill,
    Fit,
    Crop,
    Tile,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// Single-color paint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidPaint {
    pub color: Rgb,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl SolidPaint {
    /// Opaque, visible, normal-blended paint
    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            visible: true,
        }
    }

    /// Same paint with a different color; opacity, blend mode and visibility carry over
    pub fn recolored(&self, color: Rgb) -> Self {
        Self { color, ..self.clone() }
    }
}

/// Image paint referencing an image registered with the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePaint {
    pub image_hash: ImageHash,
    #[serde(default)]
    pub scale_mode: ScaleMode,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl ImagePaint {
    /// Image stretched to fill the node
    pub fn fill(image_hash: ImageHash) -> Self {
        Self {
            image_hash,
            scale_mode: ScaleMode::Fill,
            opacity: 1.0,
            visible: true,
        }
    }
}

/// A fill or stroke entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paint {
    Solid(SolidPaint),
    Image(ImagePaint),
}

impl Paint {
    /// Shorthand for an opaque solid paint
    pub fn solid(color: Rgb) -> Self {
        Self::Solid(SolidPaint::new(color))
    }

    /// Get the solid paint, if this is one
    pub fn as_solid(&self) -> Option<&SolidPaint> {
        match self {
            Self::Solid(p) => Some(p),
            _ => None,
        }
    }
}

/// Replace the color of the first solid paint, or append a new solid paint
/// when the list has none
pub fn recolor_first_solid(paints: &mut Vec<Paint>, color: Rgb) {
    let first_solid = paints.iter_mut().find_map(|p| match p {
        Paint::Solid(solid) => Some(solid),
        _ => None,
    });

    match first_solid {
        Some(solid) => *solid = solid.recolored(color),
        None => paints.push(Paint::solid(color)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#ff0000"), Some(Rgb::new(1.0, 0.0, 0.0)));
        assert_eq!(Rgb::from_hex("#0F0"), Some(Rgb::new(0.0, 1.0, 0.0)));
        assert_eq!(Rgb::from_hex("ff0000"), None);
        assert_eq!(Rgb::from_hex("#ff00"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("#abc").map(|c| c.to_hex()), Some("#aabbcc".to_string()));
    }

    #[test]
    fn test_recolor_appends_when_no_solid() {
        let mut paints = vec![Paint::Image(ImagePaint::fill(ImageHash::of(b"img")))];
        recolor_first_solid(&mut paints, Rgb::new(1.0, 0.0, 0.0));

        assert_eq!(paints.len(), 2);
        assert_eq!(paints[1], Paint::solid(Rgb::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_recolor_preserves_paint_settings() {
        let mut paints = vec![
            Paint::Solid(SolidPaint {
                color: Rgb::BLACK,
                opacity: 0.4,
                blend_mode: BlendMode::Multiply,
                visible: false,
            }),
            Paint::solid(Rgb::new(0.0, 0.0, 1.0)),
        ];
        recolor_first_solid(&mut paints, Rgb::new(1.0, 0.0, 0.0));

        let first = paints[0].as_solid().unwrap();
        assert_eq!(first.color, Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(first.opacity, 0.4);
        assert_eq!(first.blend_mode, BlendMode::Multiply);
        assert!(!first.visible);
        assert_eq!(paints[1], Paint::solid(Rgb::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_paint_json_shape() {
        let json = serde_json::to_value(Paint::solid(Rgb::BLACK)).unwrap();
        assert_eq!(json["type"], "solid");
        let back: Paint = serde_json::from_str(r#"{"type":"solid","color":{"r":1,"g":1,"b":1}}"#).unwrap();
        assert_eq!(back, Paint::solid(Rgb::new(1.0, 1.0, 1.0)));
    }
}
