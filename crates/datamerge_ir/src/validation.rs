//! Value shape checks
//!
//! Each updater expects one shape of cell value. A value of the wrong shape
//! is not an error, the updater just leaves the element alone, so these
//! checks return `Option` rather than `Result`.

use crate::value::Value;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").unwrap();
}

/// Finite number, or a string holding one
///
/// Spreadsheets often export numeric cells as text, so `" 12.5 "` counts.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Int(_) | Value::Float(_) => value.as_float()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Boolean cell
pub fn as_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}

/// Whether `s` is `#RGB` or `#RRGGBB`
pub fn is_hex_color(s: &str) -> bool {
    HEX_COLOR.is_match(s)
}

/// String holding a hex color
pub fn as_hex_color(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| is_hex_color(s))
}

/// String holding an absolute http(s) URL with a host
pub fn as_web_url(value: &Value) -> Option<Url> {
    value.as_str().and_then(parse_web_url)
}

/// Parse an absolute http(s) URL with a host
pub fn parse_web_url(s: &str) -> Option<Url> {
    let url = Url::parse(s).ok()?;
    let web = matches!(url.scheme(), "http" | "https") && url.host_str().map_or(false, |h| !h.is_empty());
    web.then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(as_number(&Value::Int(3)), Some(3.0));
        assert_eq!(as_number(&Value::Float(-1.5)), Some(-1.5));
        assert_eq!(as_number(&Value::from(" 12.5 ")), Some(12.5));
        assert_eq!(as_number(&Value::from("")), None);
        assert_eq!(as_number(&Value::from("12px")), None);
        assert_eq!(as_number(&Value::from("NaN")), None);
        assert_eq!(as_number(&Value::from("inf")), None);
        assert_eq!(as_number(&Value::Bool(true)), None);
        assert_eq!(as_number(&Value::Null), None);
    }

    #[test]
    fn test_hex_colors() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#A1b2C3"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ggg"));
        assert!(!is_hex_color("#ffffff "));
        assert_eq!(as_hex_color(&Value::Int(0xfff)), None);
    }

    #[test]
    fn test_web_urls() {
        assert!(as_web_url(&Value::from("https://example.com/a.png")).is_some());
        assert!(as_web_url(&Value::from("http://127.0.0.1:8080/x")).is_some());
        assert!(as_web_url(&Value::from("ftp://example.com/a.png")).is_none());
        assert!(as_web_url(&Value::from("#ff0000")).is_none());
        assert!(as_web_url(&Value::from("example.com")).is_none());
    }

    #[test]
    fn test_bools_are_not_parsed_from_text() {
        assert_eq!(as_bool(&Value::Bool(false)), Some(false));
        assert_eq!(as_bool(&Value::from("true")), None);
        assert_eq!(as_bool(&Value::Int(1)), None);
    }
}
