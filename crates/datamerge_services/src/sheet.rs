//! Google Sheets links and query responses

use crate::error::{ServiceError, ServiceResult, SheetUrlError};
use datamerge_ir::{validation, RawRecord, Value};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fmt;

lazy_static! {
    static ref SET_RESPONSE: Regex =
        Regex::new(r"(?s)google\.visualization\.Query\.setResponse\((.*)\);").unwrap();
}

const SHEETS_MARKER: &str = "google.com/spreadsheets/d/";
const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// A validated spreadsheet link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetUrl {
    raw: String,
    id: String,
    gid: u64,
}

impl SheetUrl {
    /// Validate a pasted spreadsheet link
    ///
    /// The tab id comes from a `gid` query or fragment parameter and
    /// defaults to the first tab.
    pub fn parse(raw: &str) -> Result<Self, SheetUrlError> {
        let url = validation::parse_web_url(raw).ok_or(SheetUrlError::Invalid)?;
        if !raw.contains(SHEETS_MARKER) {
            return Err(SheetUrlError::NotASheet);
        }

        let id = url
            .path_segments()
            .and_then(|mut segments| {
                segments.by_ref().find(|s| *s == "d")?;
                segments.next()
            })
            .filter(|id| !id.is_empty())
            .ok_or(SheetUrlError::MissingId)?
            .to_string();

        let from_fragment = url.fragment().and_then(|f| {
            f.split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(k, _)| *k == "gid")
                .map(|(_, v)| v.to_string())
        });
        let gid_text = url
            .query_pairs()
            .find(|(k, _)| k == "gid")
            .map(|(_, v)| v.into_owned())
            .or(from_fragment);

        let gid = match gid_text {
            Some(text) => text.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring non-numeric gid {:?}, using the first tab", text);
                0
            }),
            None => 0,
        };

        Ok(Self {
            raw: raw.to_string(),
            id,
            gid,
        })
    }

    /// Spreadsheet id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Tab id
    pub fn gid(&self) -> u64 {
        self.gid
    }

    /// The link as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Query endpoint returning the tab as JSON
    pub fn gviz_url(&self, proxy: Option<&str>) -> String {
        let url = format!("{}/{}/gviz/tq?tqx=out:json&tq&gid={}", SHEETS_BASE, self.id, self.gid);
        with_proxy(proxy, url)
    }

    /// Export endpoint returning the tab as CSV
    pub fn csv_url(&self, proxy: Option<&str>) -> String {
        let url = format!(
            "{}/{}/export?format=csv&id={}&gid={}",
            SHEETS_BASE, self.id, self.id, self.gid
        );
        with_proxy(proxy, url)
    }
}

impl fmt::Display for SheetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn with_proxy(proxy: Option<&str>, url: String) -> String {
    match proxy {
        Some(proxy) => format!("{}{}", proxy, url),
        None => url,
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    status: Option<String>,
    table: Table,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Table {
    parsed_num_headers: f64,
    #[serde(default)]
    cols: Vec<Column>,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Column {
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct Row {
    c: Vec<Option<Cell>>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    v: serde_json::Value,
}

impl Row {
    /// Cell values with blank cells at the end removed
    fn values(&self) -> Vec<Value> {
        let mut values: Vec<Value> = self
            .c
            .iter()
            .map(|cell| cell.as_ref().map_or(Value::Null, |c| Value::from(c.v.clone())))
            .collect();
        while values.last().map_or(false, is_blank) {
            values.pop();
        }
        values
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Parse a `google.visualization.Query.setResponse(...)` body into records
pub fn gviz_records(text: &str) -> ServiceResult<Vec<RawRecord>> {
    let payload = SET_RESPONSE
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or_else(|| ServiceError::Sheet("Unexpected sheet response".to_string()))?
        .as_str();

    let response: QueryResponse =
        serde_json::from_str(payload).map_err(|e| ServiceError::Sheet(format!("JSON parse error: {}", e)))?;
    if response.status.as_deref() == Some("error") {
        return Err(ServiceError::Sheet("Sheet query returned an error".to_string()));
    }

    let table = response.table;
    let (columns, body): (Vec<String>, &[Row]) = if table.parsed_num_headers == 1.0 {
        (table.cols.iter().map(|c| c.label.trim().to_string()).collect(), &table.rows)
    } else if table.parsed_num_headers == 0.0 {
        let first = table
            .rows
            .first()
            .ok_or_else(|| ServiceError::Sheet("No rows found".to_string()))?;
        let columns = first
            .values()
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                _ => String::new(),
            })
            .collect();
        (columns, &table.rows[1..])
    } else {
        return Err(ServiceError::Sheet("Invalid number of headers".to_string()));
    };

    Ok(body
        .iter()
        .map(|row| {
            row.values()
                .into_iter()
                .enumerate()
                .filter_map(|(i, value)| {
                    let key = columns.get(i).filter(|k| !k.is_empty())?;
                    Some((key.clone(), value))
                })
                .collect()
        })
        .collect())
}
