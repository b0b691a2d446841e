//! Property names understood by the merge engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// A property an updater exists for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    X,
    Y,
    Width,
    Height,
    Rotation,
    Text,
    Fill,
    StrokeColor,
    StrokeWeight,
    Instance,
    Hidden,
    Visible,
}

impl Property {
    /// Every known property, in table order
    pub const ALL: [Property; 12] = [
        Property::X,
        Property::Y,
        Property::Width,
        Property::Height,
        Property::Rotation,
        Property::Text,
        Property::Fill,
        Property::StrokeColor,
        Property::StrokeWeight,
        Property::Instance,
        Property::Hidden,
        Property::Visible,
    ];

    /// Column name for this property
    pub fn name(self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Width => "width",
            Property::Height => "height",
            Property::Rotation => "rotation",
            Property::Text => "text",
            Property::Fill => "fill",
            Property::StrokeColor => "stroke_color",
            Property::StrokeWeight => "stroke_weight",
            Property::Instance => "instance",
            Property::Hidden => "hidden",
            Property::Visible => "visible",
        }
    }

    /// Look up a property by exact column name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property name from a record, resolved against the known set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Known(Property),
    /// No updater is registered under this name
    Unregistered(String),
}

impl PropertyKey {
    pub fn parse(name: &str) -> Self {
        match Property::from_name(name) {
            Some(property) => Self::Known(property),
            None => Self::Unregistered(name.to_string()),
        }
    }

    /// The name as it appeared in the record
    pub fn name(&self) -> &str {
        match self {
            Self::Known(property) => property.name(),
            Self::Unregistered(name) => name,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for property in Property::ALL {
            assert_eq!(Property::from_name(property.name()), Some(property));
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(Property::from_name("stroke_color"), Some(Property::StrokeColor));
        assert_eq!(Property::from_name("Fill"), None);
        assert_eq!(Property::from_name(" x"), None);
        assert_eq!(
            PropertyKey::parse("bogus"),
            PropertyKey::Unregistered("bogus".to_string())
        );
        assert_eq!(PropertyKey::parse("bogus").name(), "bogus");
    }

    #[test]
    fn test_serde_matches_column_names() {
        let json = serde_json::to_string(&Property::StrokeWeight).unwrap();
        assert_eq!(json, "\"stroke_weight\"");
    }
}
