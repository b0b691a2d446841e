//! Raw and normalized records
//!
//! A raw record is one spreadsheet row keyed by column header. Headers of the
//! form `Element.property` address a property of every element named
//! `Element`; anything else is an unrelated column and is dropped during
//! normalization.
//!
//! Only one level of nesting exists. `a.b.c` is not read as a deeper path, it
//! is simply not a valid key.

use crate::error::{IrError, IrResult};
use crate::value::Value;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ELEMENT_KEY: Regex = Regex::new(r"^\w+\.\w+$").unwrap();
}

/// One row: column header to cell value
pub type RawRecord = IndexMap<String, Value>;

/// Properties to apply to one element name
pub type PropertyMap = IndexMap<String, Value>;

/// One row regrouped as element name to property name to value
pub type NormalizedRecord = IndexMap<String, PropertyMap>;

/// Split a header into `(element, property)` if it is a valid element key
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    if key.matches('.').count() != 1 || !ELEMENT_KEY.is_match(key) {
        return None;
    }
    key.split_once('.')
}

/// Regroup a raw record by element name
///
/// Invalid keys are dropped without error. When the same element/property
/// pair shows up more than once the later value wins.
pub fn normalize(record: &RawRecord) -> NormalizedRecord {
    let mut normalized = NormalizedRecord::new();
    for (key, value) in record {
        match split_key(key) {
            Some((element, property)) => {
                normalized
                    .entry(element.to_string())
                    .or_default()
                    .insert(property.to_string(), value.clone());
            }
            None => log::trace!("Dropping column {:?}", key),
        }
    }
    normalized
}

/// Flatten a normalized record back into `Element.property` keys
pub fn flatten(record: &NormalizedRecord) -> RawRecord {
    record
        .iter()
        .flat_map(|(element, properties)| {
            properties
                .iter()
                .map(move |(property, value)| (format!("{}.{}", element, property), value.clone()))
        })
        .collect()
}

/// Decode a JSON array of objects into raw records
pub fn records_from_json(json: &str) -> IrResult<Vec<RawRecord>> {
    let parsed: serde_json::Value = serde_json::from_str(json).map_err(|e| IrError::Json(e.to_string()))?;
    let serde_json::Value::Array(rows) = parsed else {
        return Err(IrError::NotAnArray);
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match Value::from(row) {
            Value::Object(map) => Ok(map),
            other => Err(IrError::NotAnObject {
                index,
                found: other.type_name(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, Value)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_normalize_drops_bad_keys() {
        let record = raw(&[("a.b.c", Value::Int(1)), ("ab", Value::Int(2))]);
        assert!(normalize(&record).is_empty());

        let record = raw(&[
            (".title", Value::Int(1)),
            ("Card.", Value::Int(1)),
            ("Card .title", Value::Int(1)),
            ("Card-1.title", Value::Int(1)),
        ]);
        assert!(normalize(&record).is_empty());
    }

    #[test]
    fn test_normalize_groups_by_element() {
        let record = raw(&[
            ("Card.title", Value::from("Hi")),
            ("Card.width", Value::Int(120)),
            ("Price.text", Value::from("$5")),
            ("notes", Value::from("ignored")),
        ]);
        let normalized = normalize(&record);

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized["Card"]["title"], Value::from("Hi"));
        assert_eq!(normalized["Card"]["width"], Value::Int(120));
        assert_eq!(normalized["Price"]["text"], Value::from("$5"));
    }

    #[test]
    fn test_normalize_is_idempotent_through_flatten() {
        let record = raw(&[
            ("Card.title", Value::from("Hi")),
            ("Card.fill", Value::from("#fff")),
            ("junk.a.b", Value::Null),
        ]);
        let once = normalize(&record);
        let twice = normalize(&flatten(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unicode_word_keys() {
        assert_eq!(split_key("Überschrift.text"), Some(("Überschrift", "text")));
        assert_eq!(split_key("stroke_color.x"), Some(("stroke_color", "x")));
    }

    #[test]
    fn test_records_from_json() {
        let records = records_from_json(r#"[{"Card.title": "A"}, {"Card.title": 2}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["Card.title"], Value::Int(2));

        assert_eq!(records_from_json(r#"{"a": 1}"#), Err(IrError::NotAnArray));
        assert_eq!(
            records_from_json(r#"[{"a": 1}, 3]"#),
            Err(IrError::NotAnObject { index: 1, found: "int" })
        );
    }
}
