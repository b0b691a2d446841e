//! CSV sheet exports
//!
//! RFC 4180 quoting: fields may be wrapped in double quotes, a doubled quote
//! inside a quoted field is a literal quote, and quoted fields may span
//! lines. Lines with no content are skipped.

use crate::error::{ServiceError, ServiceResult};
use datamerge_ir::{RawRecord, Value};

/// Split CSV text into rows of fields
pub fn parse_rows(text: &str) -> ServiceResult<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted_field = false;
    let mut chars = text.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted_field => {
                in_quotes = true;
                quoted_field = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                quoted_field = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                quoted_field = false;
                push_row(&mut rows, std::mem::take(&mut row));
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ServiceError::Csv(format!("unterminated quoted field ending on line {}", line)));
    }
    if !field.is_empty() || quoted_field || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    Ok(rows)
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].is_empty();
    if !blank {
        rows.push(row);
    }
}

/// Turn a cell into a value: numbers and `TRUE`/`FALSE` are typed, empty
/// cells are `None`
pub fn cell_value(cell: &str) -> Option<Value> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(Value::Bool(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(Value::Bool(false));
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Int(i));
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(Value::Float(f)),
        _ => Some(Value::String(cell.to_string())),
    }
}

/// Parse CSV with a header row into records
///
/// Header names are trimmed. Columns with an empty header and empty cells
/// are left out of the records.
pub fn records(text: &str) -> ServiceResult<Vec<RawRecord>> {
    let mut rows = parse_rows(text)?.into_iter();
    let Some(headers) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    Ok(rows
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !header.is_empty())
                .filter_map(|(header, cell)| cell_value(cell).map(|v| (header.clone(), v)))
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        let rows = parse_rows("a,\"b,c\",\"say \"\"hi\"\"\"\r\n\"multi\nline\",2,\n").unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b,c".to_string(), "say \"hi\"".to_string()],
                vec!["multi\nline".to_string(), "2".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn test_empty_lines_skipped() {
        let rows = parse_rows("a,b\n\n1,2\n\r\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(parse_rows("a,\"oops\n").is_err());
    }

    #[test]
    fn test_cell_coercion() {
        assert_eq!(cell_value("12"), Some(Value::Int(12)));
        assert_eq!(cell_value(" 1.5 "), Some(Value::Float(1.5)));
        assert_eq!(cell_value("TRUE"), Some(Value::Bool(true)));
        assert_eq!(cell_value("false"), Some(Value::Bool(false)));
        assert_eq!(cell_value("#ff0000"), Some(Value::from("#ff0000")));
        assert_eq!(cell_value("  "), None);
    }

    #[test]
    fn test_records() {
        let text = " Card.title ,Card.width,,notes\nHello,120,x,\nBye,,y,keep\n";
        let records = records(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Card.title"], Value::from("Hello"));
        assert_eq!(records[0]["Card.width"], Value::Int(120));
        assert!(!records[0].contains_key("notes"));
        assert!(!records[0].contains_key(""));
        assert!(!records[1].contains_key("Card.width"));
        assert_eq!(records[1]["notes"], Value::from("keep"));
    }
}
